use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SPEC_FIXTURE: &str = "\
title: Maumee River nitrate
prtopt: 2
seopt: 1
ldopt: 0
modno: 9
est_file: flows.csv
calib_file: samples.csv
constituents:
  - cname: nitrate as N
    ucflag: 1
    ulflag: 3
    colname: no3
";

const EST_FIXTURE: &str = "\
date,time,flow
1997-01-01,0600,104.0
1997-01-01,1800,
1997-01-02,0600,88.0
";

const CALIB_FIXTURE: &str = "\
date,time,flow,no3
1997-01-05,1200,95.0,1.50
1997-02-03,1200,77.0,1.10
";

const IND_FIXTURE: &str = "\
 date time flow amle mle ladm
 ----------
 19970101 0600 104.00 1200.0 1180.0 1150.0
 19970102 0600 88.00 900.0 890.0 880.0
";

fn stage_conf_inputs(root: &Path) -> std::path::PathBuf {
    let spec_path = root.join("maumee.yaml");
    fs::write(&spec_path, SPEC_FIXTURE).expect("spec fixture should be written");
    fs::write(root.join("flows.csv"), EST_FIXTURE).expect("estimate fixture should be written");
    fs::write(root.join("samples.csv"), CALIB_FIXTURE)
        .expect("calibration fixture should be written");
    spec_path
}

fn run_cli(current_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loadest-rs"))
        .current_dir(current_dir)
        .args(args)
        .output()
        .expect("binary should run")
}

#[test]
fn conf_command_generates_the_four_files() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_conf_inputs(temp.path());

    let output = run_cli(
        temp.path(),
        &[
            "conf",
            "maumee.yaml",
            "--est-file",
            "flows.csv",
            "--calib-file",
            "samples.csv",
        ],
    );

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated 4 files"));

    let out_dir = temp.path().join("maumee");
    for name in [
        "control.inp",
        "maumee_header.inp",
        "maumee_est.inp",
        "maumee_calib.inp",
    ] {
        assert!(out_dir.join(name).exists(), "{} should exist", name);
    }

    let est = fs::read_to_string(out_dir.join("maumee_est.inp")).expect("est file");
    assert!(est.contains("1997-01-01 0600 104.00"));
    assert!(!est.contains("1997-01-01 1800"), "non-finite row is dropped");
}

#[test]
fn conf_command_exits_with_status_ten_on_output_conflict() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_conf_inputs(temp.path());

    let out_dir = temp.path().join("maumee");
    fs::create_dir(&out_dir).expect("out dir should be created");
    fs::write(out_dir.join("stale.txt"), "old").expect("stale file should be written");

    let output = run_cli(temp.path(), &["conf", "maumee.yaml"]);

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("maumee"));
    assert!(stderr.contains("FATAL EXIT CODE: 10"));
    assert!(!out_dir.join("control.inp").exists(), "nothing was written");
}

#[test]
fn conf_command_overwrites_when_asked() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_conf_inputs(temp.path());

    let out_dir = temp.path().join("maumee");
    fs::create_dir(&out_dir).expect("out dir should be created");
    fs::write(out_dir.join("stale.txt"), "old").expect("stale file should be written");

    let output = run_cli(temp.path(), &["conf", "maumee.yaml", "--over-write"]);

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(out_dir.join("control.inp").exists());
}

#[test]
fn missing_spec_key_exits_with_schema_status() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_conf_inputs(temp.path());
    fs::write(
        temp.path().join("maumee.yaml"),
        SPEC_FIXTURE.replace("title: Maumee River nitrate\n", ""),
    )
    .expect("broken spec should be written");

    let output = run_cli(temp.path(), &["conf", "maumee.yaml"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'title'"));
}

#[test]
fn post_command_reports_series_and_exports_csv() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_conf_inputs(temp.path());

    let conf = run_cli(temp.path(), &["conf", "maumee.yaml"]);
    assert!(conf.status.success());

    fs::write(temp.path().join("maumee.ind"), IND_FIXTURE)
        .expect("ind fixture should be written");

    let output = run_cli(
        temp.path(),
        &[
            "post",
            "maumee/maumee_calib.inp",
            "maumee.ind",
            "--series-out",
            "series.csv",
        ],
    );

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("observed: 2 points"));
    assert!(stdout.contains("maumee.ind mle: 2 points"));

    let series = fs::read_to_string(temp.path().join("series.csv")).expect("series export");
    assert!(series.starts_with("series,date,time,value\n"));
}

#[test]
fn post_command_fails_on_missing_delimiter() {
    let temp = TempDir::new().expect("tempdir should be created");
    stage_conf_inputs(temp.path());

    let conf = run_cli(temp.path(), &["conf", "maumee.yaml"]);
    assert!(conf.status.success());

    fs::write(
        temp.path().join("maumee.ind"),
        IND_FIXTURE.replace(" ----------\n", ""),
    )
    .expect("broken ind fixture should be written");

    let output = run_cli(temp.path(), &["post", "maumee/maumee_calib.inp", "maumee.ind"]);

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'---'"));
}
