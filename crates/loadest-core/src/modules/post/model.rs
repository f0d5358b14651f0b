//! Named time series for downstream presentation. Observation and estimate
//! series share no guaranteed sampling; each point carries its own
//! date/time-of-day pair and no interpolation or resampling happens here.

use super::convert::{Estimator, ParsedEstimate};
use super::parser::ObservationRow;
use crate::domain::{LoadestError, LoadestResult, SiteSample};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: String,
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, date: &str, time: &str, value: f64) {
        self.points.push(SeriesPoint {
            date: date.to_string(),
            time: time.to_string(),
            value,
        });
    }
}

pub fn observed_series(rows: &[ObservationRow]) -> Series {
    let mut series = Series::new("observed");
    for row in rows {
        series.push(&row.date, &row.time, row.concentration);
    }
    series
}

pub fn flow_series(label: &str, rows: &[ParsedEstimate]) -> Series {
    let mut series = Series::new(format!("{} flow", label));
    for row in rows {
        series.push(&row.date, &row.time, row.flow_cfs);
    }
    series
}

pub fn estimator_series(label: &str, estimator: Estimator, rows: &[ParsedEstimate]) -> Series {
    let mut series = Series::new(format!("{} {}", label, estimator.as_str()));
    for row in rows {
        series.push(&row.date, &row.time, row.concentration(estimator));
    }
    series
}

/// Long-format export of the merged series, one `series,date,time,value` row
/// per point. Non-finite values are written as empty cells so the gap stays
/// renderable instead of becoming a bogus number.
pub fn write_series_csv(path: &Path, series: &[Series]) -> LoadestResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| {
        LoadestError::io_system(
            "IO.SERIES_WRITE",
            format!("failed to create series file '{}': {}", path.display(), source),
        )
    })?;

    let write_error = |source: csv::Error| {
        LoadestError::io_system(
            "IO.SERIES_WRITE",
            format!("failed to write series file '{}': {}", path.display(), source),
        )
    };

    writer
        .write_record(["series", "date", "time", "value"])
        .map_err(write_error)?;
    for one in series {
        for point in &one.points {
            let value = if point.value.is_finite() {
                point.value.to_string()
            } else {
                String::new()
            };
            writer
                .write_record([one.name.as_str(), &point.date, &point.time, &value])
                .map_err(write_error)?;
        }
    }
    writer.flush().map_err(|source| {
        LoadestError::io_system(
            "IO.SERIES_WRITE",
            format!("failed to flush series file '{}': {}", path.display(), source),
        )
    })
}

pub fn observation_samples(site: &str, constituent: &str, rows: &[ObservationRow]) -> Vec<SiteSample> {
    rows.iter()
        .map(|row| SiteSample {
            site: site.to_string(),
            constituent: constituent.to_string(),
            date: row.date.clone(),
            time: row.time.clone(),
            flow: row.flow,
            concentration: row.concentration,
        })
        .collect()
}

pub fn estimate_samples(
    site: &str,
    estimator: Estimator,
    rows: &[ParsedEstimate],
) -> Vec<SiteSample> {
    rows.iter()
        .map(|row| SiteSample {
            site: site.to_string(),
            constituent: estimator.as_str().to_string(),
            date: row.date.clone(),
            time: row.time.clone(),
            flow: row.flow_cfs,
            concentration: row.concentration(estimator),
        })
        .collect()
}
