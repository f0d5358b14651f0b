//! Configuration translator: turn a validated [`RunSpec`] plus the estimate
//! and calibration tables into the four fixed-format LOADEST input files.
//!
//! Files are written sequentially, control first, and each is closed before
//! the next is opened. There is no transactional guarantee across the set; a
//! mid-run failure can leave a partial output directory behind.

mod render;

use crate::domain::{
    LoadestError, LoadestResult, ObservationSink, OutputRole, OutputRun, RunContext, SiteSample,
};
use crate::spec::RunSpec;
use crate::tables::{FlowTable, TableRow, first_day_count};
use crate::template::{PlaceholderValues, TemplateFile, append_data_rows};
use std::fs;
use std::path::Path;

/// Enforce the output-directory precondition: create when absent, accept
/// when empty, and otherwise require the explicit overwrite option. The
/// conflict case writes nothing and carries its own exit status.
pub fn prepare_output_dir(out_dir: &Path, overwrite: bool) -> LoadestResult<()> {
    if !out_dir.exists() {
        return fs::create_dir(out_dir).map_err(|source| {
            LoadestError::io_system(
                "IO.OUT_DIR_CREATE",
                format!("failed to create output directory '{}': {}", out_dir.display(), source),
            )
        });
    }

    let mut entries = fs::read_dir(out_dir).map_err(|source| {
        LoadestError::io_system(
            "IO.OUT_DIR_READ",
            format!("failed to inspect output directory '{}': {}", out_dir.display(), source),
        )
    })?;

    if entries.next().is_some() && !overwrite {
        return Err(LoadestError::output_conflict(
            "DIR.OUTPUT_CONFLICT",
            format!("Non-empty '{}' exists, aborting", out_dir.display()),
        ));
    }

    Ok(())
}

/// Write the four files. `observation` optionally receives one
/// `(site, date, flow, concentration)` tuple per retained calibration row
/// and constituent, for an external keyed store.
pub fn translate(
    spec: &RunSpec,
    context: &RunContext,
    mut observation: Option<ObservationSink<'_>>,
) -> LoadestResult<OutputRun> {
    let base = context.base()?.to_string();
    prepare_output_dir(&context.out_dir, context.overwrite)?;

    let values = PlaceholderValues {
        created: context.created.clone(),
        source: context.spec_path.display().to_string(),
        base: base.clone(),
        run: base.clone(),
    };

    let mut run = OutputRun::new(&context.out_dir);
    for role in OutputRole::ALL {
        let path = context.out_dir.join(role.file_name(&base));
        match role {
            OutputRole::Control => {
                TemplateFile::new(render::control_lines()?).write_to(&path, &values)?;
            }
            OutputRole::Header => {
                TemplateFile::new(render::header_lines(spec)?).write_to(&path, &values)?;
            }
            OutputRole::Est => {
                write_est_file(spec, &path, &values)?;
            }
            OutputRole::Calib => {
                write_calib_file(spec, &path, &values, observation.as_mut())?;
            }
        }
        run.record(role, path);
    }

    Ok(run)
}

fn write_est_file(spec: &RunSpec, path: &Path, values: &PlaceholderValues) -> LoadestResult<()> {
    let table = FlowTable::from_path(&spec.est_file, "estimate")?;
    let retained = table.finite_rows(&[]);
    let nobs = first_day_count(&retained).ok_or_else(|| {
        LoadestError::malformed_table(
            "TABLE.EST_EMPTY",
            format!(
                "estimate table '{}' has no rows with finite flow",
                spec.est_file.display()
            ),
        )
    })?;

    TemplateFile::new(render::est_lines(nobs)?).write_to(path, values)?;
    append_data_rows(path, retained.iter().map(|row| render::est_row(row)))
}

fn write_calib_file(
    spec: &RunSpec,
    path: &Path,
    values: &PlaceholderValues,
    observation: Option<&mut ObservationSink<'_>>,
) -> LoadestResult<()> {
    let table = FlowTable::from_path(&spec.calib_file, "calibration")?;
    let columns = spec
        .constituents
        .iter()
        .map(|constituent| table.numeric_column(&constituent.colname))
        .collect::<LoadestResult<Vec<_>>>()?;
    let retained = table.finite_rows(&columns);

    TemplateFile::new(render::calib_lines()?).write_to(path, values)?;
    append_data_rows(path, retained.iter().map(|row| render::calib_row(row, &columns)))?;

    if let Some(observation) = observation {
        feed_observation_sink(spec, &columns, &retained, observation)?;
    }
    Ok(())
}

fn feed_observation_sink(
    spec: &RunSpec,
    columns: &[usize],
    rows: &[&TableRow],
    observation: &mut ObservationSink<'_>,
) -> LoadestResult<()> {
    for row in rows {
        for (constituent, &column) in spec.constituents.iter().zip(columns) {
            let sample = SiteSample {
                site: observation.site.to_string(),
                constituent: constituent.name.clone(),
                date: row.date.clone(),
                time: row.time.clone(),
                flow: row.flow,
                concentration: row.extra(column).unwrap_or(f64::NAN),
            };
            observation.sink.record(&sample)?;
        }
    }
    Ok(())
}
