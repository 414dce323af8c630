// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the subcommands that don't merge anything.

use tempfile::TempDir;

use crate::{get_cmd_output, millecal};

#[test]
fn test_labels() {
    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "labels",
            "1000000003", "27001200330", "-5",
        ])
        .ok();
    assert!(cmd.is_ok(), "labels failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(
        stdout.contains("1000000003 (Beam vertex, parameter 3) -> BeamParameters"),
        "{stdout}"
    );
    assert!(
        stdout.contains("27001200330 (CDC wire 10/3, parameter 30) -> CDCCalibration"),
        "{stdout}"
    );
    assert!(stdout.contains("-5 (unrecognised)"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_labels_needs_a_label() {
    let cmd = millecal().args(["labels"]).ok();
    assert!(cmd.is_err());
}

#[test]
fn test_constraints() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("cons.txt");

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "constraints",
            "--output", &format!("{}", output.display()),
            "--no-twist",
        ])
        .ok();
    assert!(cmd.is_ok(), "constraints failed: {}", cmd.err().unwrap());

    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.matches("Constraint 0").count(), 5);
    assert!(contents.starts_with("! CDC layers"), "{contents}");
}

#[test]
fn test_scale_constraints() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("cons.txt");

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "constraints",
            "--output", &format!("{}", output.display()),
            "--no-rigid", "--no-twist",
            "--z-offset", "--r-scale",
        ])
        .ok();
    assert!(cmd.is_ok(), "constraints failed: {}", cmd.err().unwrap());

    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.matches("Constraint 0").count(), 3);
    assert!(
        contents.starts_with("! CDC stereo layers, z offset"),
        "{contents}"
    );
    // Layer 8 is the first stereo layer; its coefficient is the U2 stereo
    // angle times its radius.
    assert!(contents.contains("\n27001051106 1.7476"), "{contents}");
}

#[test]
fn test_save_toml_reproduces_merge_args() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = millecal()
        .args([
            "merge",
            "--runs", "12,5",
            "--max-pull", "20",
            "--save-toml", &format!("{}", toml.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "merge dry run failed: {}", cmd.err().unwrap());

    let contents = std::fs::read_to_string(&toml).unwrap();
    assert!(contents.contains("runs = [\"12,5\"]"), "{contents}");
    assert!(contents.contains("max_pull = 20.0"), "{contents}");
}
