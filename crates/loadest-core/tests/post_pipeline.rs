//! Full pipeline: generate the calibration file with the translator, stage a
//! LOADEST-style `.ind` output next to it, then parse, convert and merge.

use loadest_core::domain::{OutputRole, RunContext};
use loadest_core::modules::conf::translate;
use loadest_core::modules::post::{PostRequest, run_post};
use loadest_core::spec::{Constituent, RunSpec};
use std::fs;
use tempfile::TempDir;

const IND_FIXTURE: &str = "\
# LOADEST individual estimates for maumee
 constituent: nitrate as N
 date       time   flow     amle     mle      ladm
 ---------- ------ -------- -------- -------- --------
 19970101   0600   104.00   1200.0   1180.0   1150.0
 19970101   1800   101.00   1100.0   1085.0   1060.0
 19970102   0600   0.00     900.0    890.0    880.0
";

#[test]
fn generated_calibration_file_feeds_the_post_pass() {
    let temp = TempDir::new().expect("tempdir");
    fs::write(
        temp.path().join("flows.csv"),
        "date,time,flow\n1997-01-01,0600,104.0\n1997-01-02,0600,88.0\n",
    )
    .expect("estimate fixture");
    fs::write(
        temp.path().join("samples.csv"),
        "date,time,flow,no3\n1997-01-05,1200,95.0,1.50\n1997-02-03,1200,77.0,1.10\n",
    )
    .expect("calibration fixture");

    let spec = RunSpec {
        title: "Maumee River nitrate".to_string(),
        prtopt: "2".to_string(),
        seopt: "1".to_string(),
        ldopt: "0".to_string(),
        modno: "9".to_string(),
        est_file: temp.path().join("flows.csv"),
        calib_file: temp.path().join("samples.csv"),
        constituents: vec![Constituent {
            name: "nitrate as N".to_string(),
            ucflag: 1,
            ulflag: 3,
            colname: "no3".to_string(),
        }],
    };
    let context = RunContext::new(temp.path().join("maumee.yaml"), temp.path().join("maumee"), false)
        .expect("context should build");
    let run = translate(&spec, &context, None).expect("translate should succeed");

    let ind_path = temp.path().join("maumee.ind");
    fs::write(&ind_path, IND_FIXTURE).expect("ind fixture");

    let summary = run_post(&PostRequest {
        obs_path: run.path(OutputRole::Calib).expect("calib path").to_path_buf(),
        ind_paths: vec![ind_path],
    })
    .expect("post should succeed");

    assert_eq!(summary.observed.len(), 2);
    assert!((summary.observed[0].concentration - 1.5).abs() < 1.0e-12);

    let series = summary.merged_series();
    assert_eq!(series.len(), 5, "observed + 3 estimators + flow");

    let amle = series
        .iter()
        .find(|one| one.name == "maumee.ind amle")
        .expect("amle series");
    assert_eq!(amle.points.len(), 3);
    // 1200 / (104 / 35.315 * 86400) * 1000
    let expected = 1200.0 / (104.0 / 35.315 * 86400.0) * 1000.0;
    assert!((amle.points[0].value - expected).abs() < 1.0e-9);
    assert!(
        !amle.points[2].value.is_finite(),
        "zero-flow row stays as a visible gap"
    );

    let export = temp.path().join("series.csv");
    summary.export_series_csv(&export).expect("export should succeed");
    let written = fs::read_to_string(&export).expect("read");
    assert!(written.starts_with("series,date,time,value\n"));
    assert_eq!(written.lines().count(), 1 + 2 + 4 * 3);
}
