//! Parsers for the LOADEST output side: the `.ind` individual-estimates
//! table the external program writes, and the generated calibration `.inp`
//! read back as the observation series.

use crate::domain::{LoadestError, LoadestResult};

/// One data row of a LOADEST `.ind` output file.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRow {
    pub date: String,
    pub time: String,
    pub flow: f64,
    pub amle: f64,
    pub mle: f64,
    pub ladm: f64,
}

/// One row of the observation (calibration) input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub date: String,
    pub time: String,
    pub flow: f64,
    pub concentration: f64,
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn data_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty() && !is_comment(line))
}

/// Parse a `.ind` output table. Everything up to and including the first
/// line whose first token starts with `---` is preamble and is discarded;
/// comment and blank lines are skipped throughout. Rows carry at least the
/// six known fields; variants with trailing columns are read the same way.
pub fn parse_estimates(source: &str, origin: &str) -> LoadestResult<Vec<EstimateRow>> {
    let mut in_data = false;
    let mut rows = Vec::new();

    for (line_number, line) in data_lines(source) {
        if !in_data {
            if line
                .split_whitespace()
                .next()
                .is_some_and(|token| token.starts_with("---"))
            {
                in_data = true;
            }
            continue;
        }

        // trailing columns beyond the six known fields are tolerated
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(LoadestError::malformed_table(
                "TABLE.IND_ROW",
                format!(
                    "'{}' line {}: expected at least 6 fields (date time flow amle mle ladm), found {}",
                    origin,
                    line_number,
                    fields.len()
                ),
            ));
        }

        rows.push(EstimateRow {
            date: fields[0].to_string(),
            time: fields[1].to_string(),
            flow: parse_field(fields[2], "flow", origin, line_number)?,
            amle: parse_field(fields[3], "amle", origin, line_number)?,
            mle: parse_field(fields[4], "mle", origin, line_number)?,
            ladm: parse_field(fields[5], "ladm", origin, line_number)?,
        });
    }

    if !in_data {
        return Err(LoadestError::malformed_table(
            "TABLE.IND_DELIMITER",
            format!("'{}' has no '---' delimiter line before the data block", origin),
        ));
    }

    Ok(rows)
}

/// Parse the observation file the translator generated: comment-skipping,
/// columns `date time flow conc...`. Only the first concentration column is
/// read; extra constituent columns are tolerated.
pub fn parse_observations(source: &str, origin: &str) -> LoadestResult<Vec<ObservationRow>> {
    let mut rows = Vec::new();
    for (line_number, line) in data_lines(source) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(LoadestError::malformed_table(
                "TABLE.OBS_ROW",
                format!(
                    "'{}' line {}: expected at least 4 fields (date time flow conc), found {}",
                    origin,
                    line_number,
                    fields.len()
                ),
            ));
        }
        rows.push(ObservationRow {
            date: fields[0].to_string(),
            time: fields[1].to_string(),
            flow: parse_field(fields[2], "flow", origin, line_number)?,
            concentration: parse_field(fields[3], "conc", origin, line_number)?,
        });
    }
    Ok(rows)
}

fn parse_field(token: &str, field: &str, origin: &str, line_number: usize) -> LoadestResult<f64> {
    token.parse::<f64>().map_err(|_| {
        LoadestError::malformed_table(
            "TABLE.FIELD",
            format!(
                "'{}' line {} field '{}': '{}' is not numeric",
                origin, line_number, field, token
            ),
        )
    })
}
