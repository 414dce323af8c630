// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with running the global fit or reading its outputs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitError {
    #[error("Couldn't start the global fit executable '{binary}': {err}")]
    Spawn {
        binary: PathBuf,
        err: std::io::Error,
    },

    #[error("{file}:{line_num}: couldn't parse result line '{line}'")]
    BadResultLine {
        file: PathBuf,
        line_num: usize,
        line: String,
    },

    #[error("{file}: expected a header line starting with 'Parameter'")]
    MissingResultHeader { file: PathBuf },

    #[error("{file}: couldn't parse an exit code from '{got}'")]
    BadExitCode { file: PathBuf, got: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
