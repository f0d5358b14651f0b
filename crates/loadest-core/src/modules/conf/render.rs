//! Line layouts for the four generated files. Column widths and the order of
//! header fields are positional contracts with LOADEST; change nothing here
//! without a format reference.

use crate::domain::{FLAG_FIELD_WIDTH, LoadestResult, NAME_FIELD_WIDTH};
use crate::spec::{Constituent, RunSpec};
use crate::tables::TableRow;
use crate::template::{TemplateLine, banner_lines};

pub(super) fn control_lines() -> LoadestResult<Vec<TemplateLine>> {
    let mut lines = banner_lines()?;
    lines.extend([
        TemplateLine::literal("# Header file"),
        TemplateLine::parse("{base}_header.inp")?,
        TemplateLine::literal("# Calibration file (observations of conc.)"),
        TemplateLine::parse("{base}_calib.inp")?,
        TemplateLine::literal("# Estimation file (flow times / levels to estimate loads)"),
        TemplateLine::parse("{base}_est.inp")?,
    ]);
    Ok(lines)
}

pub(super) fn header_lines(spec: &RunSpec) -> LoadestResult<Vec<TemplateLine>> {
    let mut lines = banner_lines()?;
    lines.extend([
        TemplateLine::literal("# Title"),
        TemplateLine::literal(spec.title.clone()),
        TemplateLine::literal("# PRTOPT estimated values print option"),
        TemplateLine::literal(spec.prtopt.clone()),
        TemplateLine::literal("# SEOPT standard error option"),
        TemplateLine::literal(spec.seopt.clone()),
        TemplateLine::literal("# LDOPT, load option"),
        TemplateLine::literal(spec.ldopt.clone()),
        TemplateLine::literal("# MODNO, model number selection"),
        TemplateLine::literal(spec.modno.clone()),
        TemplateLine::literal("# NCONST, number of constituents"),
        TemplateLine::value(spec.constituent_count()),
        TemplateLine::literal("# Constituents, and UCFLAG, ULFLAG"),
    ]);
    for constituent in &spec.constituents {
        lines.push(TemplateLine::literal(constituent_line(constituent)));
    }
    Ok(lines)
}

pub(super) fn est_lines(nobs: usize) -> LoadestResult<Vec<TemplateLine>> {
    let mut lines = banner_lines()?;
    lines.extend([
        TemplateLine::literal("# NOBSPD, number of obs. per day"),
        TemplateLine::value(nobs),
        TemplateLine::literal("# date time flow"),
    ]);
    Ok(lines)
}

pub(super) fn calib_lines() -> LoadestResult<Vec<TemplateLine>> {
    let mut lines = banner_lines()?;
    lines.push(TemplateLine::literal("# date time flow conc(s)"));
    Ok(lines)
}

/// 45-character left-justified name, then two 5-character right-justified
/// flags; 55 characters total, no separators.
pub(super) fn constituent_line(constituent: &Constituent) -> String {
    format!(
        "{:<name_width$}{:>flag_width$}{:>flag_width$}",
        constituent.name,
        constituent.ucflag,
        constituent.ulflag,
        name_width = NAME_FIELD_WIDTH,
        flag_width = FLAG_FIELD_WIDTH,
    )
}

pub(super) fn est_row(row: &TableRow) -> String {
    format!("{} {} {:.2}", row.date, row.time, row.flow)
}

pub(super) fn calib_row(row: &TableRow, concentration_columns: &[usize]) -> String {
    let mut rendered = est_row(row);
    for &column in concentration_columns {
        // columns were resolved against this table before filtering
        let value = row.extra(column).unwrap_or(f64::NAN);
        rendered.push_str(&format!(" {:.2}", value));
    }
    rendered
}
