// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading or writing conditions stores.

use std::path::PathBuf;

use thiserror::Error;

use crate::payloads::PayloadError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{file}:{line_num}: expected '<payload name> <revision> <iov>', got '{line}'")]
    BadIndexLine {
        file: PathBuf,
        line_num: usize,
        line: String,
    },

    #[error("Payload file {file} is not valid: {err}")]
    BadPayloadFile { file: PathBuf, err: PayloadError },

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
