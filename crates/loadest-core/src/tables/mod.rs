//! Estimate and calibration tables. Both are CSV files with at least
//! `date`, `time` and `flow` columns; the calibration table additionally
//! carries one concentration column per constituent. Only flow and the
//! selected concentration columns are coerced to numbers; remark and
//! station columns ride along as text and are never a reason to abort.

use crate::domain::{LoadestError, LoadestResult};
use std::path::Path;

/// One table row. `extras` holds every non-core column as raw cell text in
/// header order; coercion happens per selected column, not per row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: String,
    pub time: String,
    pub flow: f64,
    extras: Vec<String>,
}

impl TableRow {
    /// Numeric reading of an extra cell. Empty and textual cells read as
    /// NaN; select a column with [`FlowTable::numeric_column`] to reject
    /// text up front instead.
    pub fn extra(&self, index: usize) -> Option<f64> {
        self.extras.get(index).map(|text| numeric_cell(text))
    }
}

fn numeric_cell(text: &str) -> f64 {
    if text.is_empty() {
        f64::NAN
    } else {
        text.parse().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowTable {
    label: String,
    extra_columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl FlowTable {
    pub fn from_path(path: &Path, label: &str) -> LoadestResult<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| {
            LoadestError::io_system(
                "IO.TABLE_READ",
                format!("failed to open {} table '{}': {}", label, path.display(), source),
            )
        })?;

        let headers = reader
            .headers()
            .map_err(|source| {
                LoadestError::malformed_table(
                    "TABLE.HEADER",
                    format!("{} table '{}' has no readable header: {}", label, path.display(), source),
                )
            })?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let date_index = required_column(&headers, "date", label, path)?;
        let time_index = required_column(&headers, "time", label, path)?;
        let flow_index = required_column(&headers, "flow", label, path)?;

        let extra_columns = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| ![date_index, time_index, flow_index].contains(index))
            .map(|(_, name)| name.clone())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for (row_number, record) in reader.records().enumerate() {
            let record = record.map_err(|source| {
                LoadestError::malformed_table(
                    "TABLE.ROW",
                    format!(
                        "{} table '{}' row {}: {}",
                        label,
                        path.display(),
                        row_number + 1,
                        source
                    ),
                )
            })?;

            let flow = parse_cell(record.get(flow_index), "flow", label, row_number)?;
            let mut extras = Vec::with_capacity(extra_columns.len());
            for (index, _) in headers.iter().enumerate() {
                if [date_index, time_index, flow_index].contains(&index) {
                    continue;
                }
                extras.push(record.get(index).unwrap_or_default().trim().to_string());
            }

            rows.push(TableRow {
                date: record.get(date_index).unwrap_or_default().trim().to_string(),
                time: record.get(time_index).unwrap_or_default().trim().to_string(),
                flow,
                extras,
            });
        }

        Ok(Self {
            label: label.to_string(),
            extra_columns,
            rows,
        })
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Index of a named concentration column among the extras, as configured
    /// by a constituent's `colname`. Coerce it with [`Self::numeric_column`]
    /// when its cells must be numbers.
    pub fn column(&self, name: &str) -> LoadestResult<usize> {
        self.extra_columns
            .iter()
            .position(|candidate| candidate == name)
            .ok_or_else(|| {
                LoadestError::malformed_table(
                    "TABLE.COLUMN",
                    format!(
                        "{} table has no column '{}' (available: {})",
                        self.label,
                        name,
                        self.extra_columns.join(", ")
                    ),
                )
            })
    }

    /// Resolve a column that must hold numbers: every non-empty cell has to
    /// parse, and the first offender aborts with its row, column and text.
    /// Columns never selected this way stay uncoerced.
    pub fn numeric_column(&self, name: &str) -> LoadestResult<usize> {
        let index = self.column(name)?;
        for (row_number, row) in self.rows.iter().enumerate() {
            let text = row.extras.get(index).map(String::as_str).unwrap_or_default();
            if !text.is_empty() && text.parse::<f64>().is_err() {
                return Err(LoadestError::malformed_table(
                    "TABLE.CELL",
                    format!(
                        "{} table row {} column '{}': '{}' is not numeric",
                        self.label,
                        row_number + 1,
                        name,
                        text
                    ),
                ));
            }
        }
        Ok(index)
    }

    /// Rows retained after the non-finite filter: flow must be finite, and so
    /// must every listed extra column. Source order is preserved.
    pub fn finite_rows(&self, required_extras: &[usize]) -> Vec<&TableRow> {
        self.rows
            .iter()
            .filter(|row| {
                row.flow.is_finite()
                    && required_extras.iter().all(|&index| {
                        row.extra(index).is_some_and(f64::is_finite)
                    })
            })
            .collect()
    }
}

/// Observations per day for the NOBSPD header field: group the retained rows
/// by date and count the first group. Grouping follows the date's sort
/// order, so the first group is the earliest date in lexicographic order.
pub fn first_day_count(rows: &[&TableRow]) -> Option<usize> {
    let first_date = rows.iter().map(|row| row.date.as_str()).min()?;
    Some(rows.iter().filter(|row| row.date == first_date).count())
}

fn required_column(
    headers: &[String],
    name: &str,
    label: &str,
    path: &Path,
) -> LoadestResult<usize> {
    headers
        .iter()
        .position(|candidate| candidate == name)
        .ok_or_else(|| {
            LoadestError::malformed_table(
                "TABLE.COLUMN",
                format!(
                    "{} table '{}' is missing required column '{}'",
                    label,
                    path.display(),
                    name
                ),
            )
        })
}

fn parse_cell(
    cell: Option<&str>,
    column: &str,
    label: &str,
    row_number: usize,
) -> LoadestResult<f64> {
    let text = cell.unwrap_or_default().trim();
    if text.is_empty() {
        return Ok(f64::NAN);
    }
    text.parse::<f64>().map_err(|_| {
        LoadestError::malformed_table(
            "TABLE.CELL",
            format!(
                "{} table row {} column '{}': '{}' is not numeric",
                label,
                row_number + 1,
                column,
                text
            ),
        )
    })
}
