pub mod errors;

pub use errors::{ExitStatusContract, LoadestError, LoadestErrorCategory, LoadestResult};

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Width of the constituent-name field in the generated header file.
pub const NAME_FIELD_WIDTH: usize = 45;
/// Width of each constituent flag field. Flags are right-justified; a value
/// that cannot render in this many characters would shift every column after
/// it, so the loader rejects such values up front.
pub const FLAG_FIELD_WIDTH: usize = 5;
pub const FLAG_MIN: i64 = -9_999;
pub const FLAG_MAX: i64 = 99_999;

/// Role of each generated LOADEST input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputRole {
    Control,
    Header,
    Calib,
    Est,
}

impl OutputRole {
    pub const ALL: [OutputRole; 4] = [Self::Control, Self::Header, Self::Est, Self::Calib];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Header => "header",
            Self::Calib => "calib",
            Self::Est => "est",
        }
    }

    /// File name inside the output directory. The control file has a fixed
    /// name; the other three are prefixed with the run base name.
    pub fn file_name(self, base: &str) -> String {
        match self {
            Self::Control => "control.inp".to_string(),
            other => format!("{}_{}.inp", base, other.as_str()),
        }
    }
}

impl Display for OutputRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Per-run context threaded explicitly through the translator instead of any
/// process-wide state: where the specification came from, where output goes,
/// and whether pre-existing output may be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub spec_path: PathBuf,
    pub out_dir: PathBuf,
    pub overwrite: bool,
    /// Human-readable creation stamp substituted into every file banner.
    pub created: String,
}

impl RunContext {
    pub fn new(
        spec_path: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        overwrite: bool,
    ) -> LoadestResult<Self> {
        let context = Self {
            spec_path: spec_path.into(),
            out_dir: out_dir.into(),
            overwrite,
            created: chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
        };
        context.base()?;
        Ok(context)
    }

    /// Base name of the output directory, used as the filename prefix and as
    /// the run label in the banners.
    pub fn base(&self) -> LoadestResult<&str> {
        self.out_dir
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                LoadestError::schema(
                    "INPUT.RUN_NAME",
                    format!(
                        "output directory '{}' does not yield a usable run base name",
                        self.out_dir.display()
                    ),
                )
            })
    }
}

/// The four produced files, keyed by role, in the order they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRun {
    pub out_dir: PathBuf,
    files: Vec<(OutputRole, PathBuf)>,
}

impl OutputRun {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            files: Vec::with_capacity(OutputRole::ALL.len()),
        }
    }

    pub fn record(&mut self, role: OutputRole, path: PathBuf) {
        self.files.push((role, path));
    }

    pub fn path(&self, role: OutputRole) -> Option<&Path> {
        self.files
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, path)| path.as_path())
    }

    pub fn files(&self) -> &[(OutputRole, PathBuf)] {
        &self.files
    }
}

/// One `(site, date, flow, concentration)` tuple for an external keyed store.
/// The store itself is out of scope; this core only exposes the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSample {
    pub site: String,
    pub constituent: String,
    pub date: String,
    pub time: String,
    pub flow: f64,
    pub concentration: f64,
}

/// Destination for per-row samples. Implemented by external persistence
/// collaborators; the translator only feeds it.
pub trait SampleSink {
    fn record(&mut self, sample: &SiteSample) -> LoadestResult<()>;
}

/// A sink bound to a named site, as selected on the command line.
pub struct ObservationSink<'a> {
    pub site: &'a str,
    pub sink: &'a mut dyn SampleSink,
}

#[cfg(test)]
mod tests {
    use super::{OutputRole, OutputRun, RunContext};

    #[test]
    fn output_roles_name_their_files_from_the_run_base() {
        assert_eq!(OutputRole::Control.file_name("april"), "control.inp");
        assert_eq!(OutputRole::Header.file_name("april"), "april_header.inp");
        assert_eq!(OutputRole::Calib.file_name("april"), "april_calib.inp");
        assert_eq!(OutputRole::Est.file_name("april"), "april_est.inp");
    }

    #[test]
    fn run_context_derives_base_from_output_dir() {
        let context =
            RunContext::new("conf/april.yaml", "runs/april", false).expect("context should build");
        assert_eq!(context.base().expect("base"), "april");
        assert!(!context.created.is_empty());
    }

    #[test]
    fn output_run_tracks_files_by_role() {
        let mut run = OutputRun::new("runs/april");
        run.record(OutputRole::Control, "runs/april/control.inp".into());
        run.record(OutputRole::Header, "runs/april/april_header.inp".into());

        assert!(run.path(OutputRole::Control).is_some());
        assert!(run.path(OutputRole::Est).is_none());
        assert_eq!(run.files().len(), 2);
    }
}
