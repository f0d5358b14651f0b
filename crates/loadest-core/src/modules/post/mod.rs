//! Result translator: parse LOADEST `.ind` outputs, convert loads to
//! concentration units, and merge them with the observation series for
//! plotting or storage.

pub mod convert;
pub mod model;
pub mod parser;

pub use convert::{Estimator, ParsedEstimate};
pub use model::{Series, SeriesPoint};
pub use parser::{EstimateRow, ObservationRow};

use crate::domain::{LoadestError, LoadestResult, SiteSample};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs for one post-processing pass: the observation file the translator
/// generated, plus one or more `.ind` outputs from the external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub obs_path: PathBuf,
    pub ind_paths: Vec<PathBuf>,
}

/// One parsed and converted `.ind` file.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRun {
    pub source: PathBuf,
    pub rows: Vec<ParsedEstimate>,
}

impl EstimateRun {
    fn label(&self) -> String {
        self.source
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("estimates")
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub observed: Vec<ObservationRow>,
    pub runs: Vec<EstimateRun>,
}

impl PostSummary {
    /// The named series set for downstream consumption: the observed
    /// concentration, then per input file one concentration series per
    /// estimator plus the flow series.
    pub fn merged_series(&self) -> Vec<Series> {
        let mut series = vec![model::observed_series(&self.observed)];
        for run in &self.runs {
            let label = run.label();
            for estimator in Estimator::ALL {
                series.push(model::estimator_series(&label, estimator, &run.rows));
            }
            series.push(model::flow_series(&label, &run.rows));
        }
        series
    }

    /// Per-row tuples for an external keyed store: every observation, then
    /// every estimate under each estimator.
    pub fn site_samples(&self, site: &str, constituent: &str) -> Vec<SiteSample> {
        let mut samples = model::observation_samples(site, constituent, &self.observed);
        for run in &self.runs {
            for estimator in Estimator::ALL {
                samples.extend(model::estimate_samples(site, estimator, &run.rows));
            }
        }
        samples
    }

    pub fn export_series_csv(&self, path: &Path) -> LoadestResult<()> {
        model::write_series_csv(path, &self.merged_series())
    }
}

pub fn run_post(request: &PostRequest) -> LoadestResult<PostSummary> {
    let obs_source = read_input(&request.obs_path)?;
    let observed = parser::parse_observations(&obs_source, &display_name(&request.obs_path))?;

    let mut runs = Vec::with_capacity(request.ind_paths.len());
    for ind_path in &request.ind_paths {
        let source = read_input(ind_path)?;
        let rows = parser::parse_estimates(&source, &display_name(ind_path))?;
        runs.push(EstimateRun {
            source: ind_path.clone(),
            rows: convert::convert_estimates(rows),
        });
    }

    Ok(PostSummary { observed, runs })
}

fn read_input(path: &Path) -> LoadestResult<String> {
    fs::read_to_string(path).map_err(|source| {
        LoadestError::io_system(
            "IO.POST_READ",
            format!("failed to read '{}': {}", path.display(), source),
        )
    })
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}
