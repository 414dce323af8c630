// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod merge;
mod utilities;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn millecal() -> Command {
    Command::cargo_bin("millecal").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

struct Files {
    /// A glob matching the (empty) derivative files.
    input: String,
    res: PathBuf,
    database: PathBuf,
}

/// Lay out the outputs of a pede run that has already happened. `rows` are
/// `label correction error` triples; `exit_code` goes into `millepede.end`.
fn make_fit_outputs(dir: &Path, rows: &[(i64, f64, f64)], exit_code: i32) -> Files {
    File::create(dir.join("mille.bin")).unwrap();

    let res = dir.join("millepede.res");
    let mut f = File::create(&res).unwrap();
    writeln!(
        f,
        " Parameter   ! first 3 elements per line are significant (if used as input)"
    )
    .unwrap();
    for (label, correction, error) in rows {
        writeln!(f, "{label} {correction} 0.0 {correction} {error}").unwrap();
    }
    drop(f);

    std::fs::write(
        dir.join("millepede.end"),
        format!("{exit_code} ! Ended normally\n"),
    )
    .unwrap();

    Files {
        input: format!("{}/*.bin", dir.display()),
        res,
        database: dir.join("db"),
    }
}
