// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, make_fit_outputs, millecal, Files};

#[test]
fn test_merge_accepts_small_corrections() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        input,
        res,
        database,
    } = make_fit_outputs(
        tmp_dir.path(),
        &[(1000000001, 0.01, 1.0), (27001200330, -0.02, 0.5)],
        0,
    );

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "merge",
            "--input", &input,
            "--runs", "1,1", "1,3",
            "--database", &format!("{}", database.display()),
            "--results", &format!("{}", res.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "merge failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("Verdict: accept"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");

    let index = std::fs::read_to_string(database.join("database.txt")).unwrap();
    assert_eq!(
        index,
        "BeamParameters 1 1,1,1,3\nCDCCalibration 1 1,1,1,3\n"
    );
    assert!(database.join("BeamParameters_rev_1.json").exists());
    assert!(database.join("CDCCalibration_rev_1.json").exists());
}

#[test]
fn test_merge_iterates_on_large_pulls() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        input,
        res,
        database,
    } = make_fit_outputs(tmp_dir.path(), &[(1000000003, 5.0, 1.0)], 0);

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "merge",
            "--input", &input,
            "--runs", "1,1",
            "--database", &format!("{}", database.display()),
            "--results", &format!("{}", res.display()),
        ])
        .assert()
        .code(2);
    let (stdout, _) = get_cmd_output(Ok(cmd.get_output().clone()));
    assert!(stdout.contains("Verdict: iterate"), "{stdout}");

    // The corrections are still written.
    let index = std::fs::read_to_string(database.join("database.txt")).unwrap();
    assert_eq!(index, "BeamParameters 1 1,1,1,1\n");
}

#[test]
fn test_merge_failed_fit_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        input,
        res,
        database,
    } = make_fit_outputs(tmp_dir.path(), &[(1000000001, 0.01, 1.0)], 30);

    #[rustfmt::skip]
    let assert = millecal()
        .args([
            "merge",
            "--input", &input,
            "--runs", "1,1",
            "--database", &format!("{}", database.display()),
            "--results", &format!("{}", res.display()),
        ])
        .assert();
    assert.code(1);
    assert!(!database.join("database.txt").exists());
}

#[test]
fn test_merge_without_runs_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        input,
        res,
        database,
    } = make_fit_outputs(tmp_dir.path(), &[(1000000001, 0.01, 1.0)], 0);

    #[rustfmt::skip]
    let assert = millecal()
        .args([
            "merge",
            "--input", &input,
            "--database", &format!("{}", database.display()),
            "--results", &format!("{}", res.display()),
        ])
        .assert();
    assert.code(1);
    assert!(!database.join("database.txt").exists());
}

#[test]
fn test_merge_bad_glob_is_an_error() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "merge",
            "--input", &format!("{}/nothing_*.bin", tmp_dir.path().display()),
            "--runs", "1,1",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
}

#[test]
fn test_merge_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        input,
        res,
        database,
    } = make_fit_outputs(tmp_dir.path(), &[(1000000001, 0.01, 1.0)], 0);

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "merge",
            "--input", &input,
            "--runs", "1,1",
            "--database", &format!("{}", database.display()),
            "--results", &format!("{}", res.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    assert!(!database.exists());
}
