use super::CliError;
use loadest_core::domain::{
    LoadestResult, ObservationSink, RunContext, SampleSink, SiteSample,
};
use loadest_core::modules::conf::translate;
use loadest_core::modules::post::{PostRequest, run_post};
use loadest_core::spec::{SpecOverrides, load_run_spec};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(clap::Args)]
pub(super) struct ConfArgs {
    /// Run specification in YAML format
    #[arg(value_name = "CONFFILE")]
    source: PathBuf,

    /// Base name to use for the run / outputs folder
    #[arg(long, value_name = "NAME")]
    run_name: Option<String>,

    /// "Estimates" file, flows at times when loads are wanted
    #[arg(long, value_name = "CSVFILE")]
    est_file: Option<PathBuf>,

    /// Calibration file, observations of concentrations
    #[arg(long, value_name = "CSVFILE")]
    calib_file: Option<PathBuf>,

    /// Override model number in CONFFILE
    #[arg(long)]
    modno: Option<String>,

    /// Over-write existing outputs
    #[arg(long)]
    over_write: bool,

    /// Site name attached to observation tuples for an external store
    #[arg(long)]
    site: Option<String>,
}

#[derive(clap::Args)]
pub(super) struct PostArgs {
    /// Observation (calibration) INPut file
    #[arg(value_name = "OBSFILE")]
    obs: PathBuf,

    /// INDividual-outputs .ind file(s)
    #[arg(value_name = "INDFILE", required = true)]
    ind: Vec<PathBuf>,

    /// Write the merged series to a long-format CSV file
    #[arg(long, value_name = "CSVFILE")]
    series_out: Option<PathBuf>,
}

/// Counts samples routed to the (external) store boundary and logs them.
/// Stands in for a real persistence collaborator.
#[derive(Default)]
struct TracingSampleSink {
    recorded: usize,
}

impl SampleSink for TracingSampleSink {
    fn record(&mut self, sample: &SiteSample) -> LoadestResult<()> {
        self.recorded += 1;
        info!(
            site = %sample.site,
            constituent = %sample.constituent,
            date = %sample.date,
            "observation tuple ready for store"
        );
        Ok(())
    }
}

pub(super) fn run_conf_command(args: ConfArgs) -> Result<i32, CliError> {
    let overrides = SpecOverrides {
        est_file: args.est_file,
        calib_file: args.calib_file,
        modno: args.modno,
    };
    let spec = load_run_spec(&args.source, &overrides).map_err(CliError::Core)?;

    // for `some_run.yaml` output goes in folder `some_run`
    let out_dir = match &args.run_name {
        Some(name) => PathBuf::from(name),
        None => args.source.with_extension(""),
    };
    let context =
        RunContext::new(&args.source, out_dir, args.over_write).map_err(CliError::Core)?;
    if context.overwrite {
        warn!(out_dir = %context.out_dir.display(), "over-writing existing outputs");
    }

    let mut sink = TracingSampleSink::default();
    let observation = args.site.as_deref().map(|site| ObservationSink {
        site,
        sink: &mut sink,
    });

    info!(source = %args.source.display(), "generating LOADEST input files");
    let run = translate(&spec, &context, observation).map_err(CliError::Core)?;

    for (role, path) in run.files() {
        println!("{}: {}", role, path.display());
    }
    if args.site.is_some() {
        println!("Recorded {} observation tuples for the store.", sink.recorded);
    }
    println!(
        "Generated {} files in '{}'.",
        run.files().len(),
        run.out_dir.display()
    );
    Ok(0)
}

pub(super) fn run_post_command(args: PostArgs) -> Result<i32, CliError> {
    info!(obs = %args.obs.display(), runs = args.ind.len(), "post-processing LOADEST output");
    let summary = run_post(&PostRequest {
        obs_path: args.obs,
        ind_paths: args.ind,
    })
    .map_err(CliError::Core)?;

    for series in summary.merged_series() {
        let gaps = series
            .points
            .iter()
            .filter(|point| !point.value.is_finite())
            .count();
        println!(
            "{}: {} points ({} undefined)",
            series.name,
            series.points.len(),
            gaps
        );
    }

    if let Some(series_out) = args.series_out.as_deref() {
        summary.export_series_csv(series_out).map_err(CliError::Core)?;
        println!("Series written to {}", series_out.display());
    }
    Ok(0)
}
