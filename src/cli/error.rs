// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all millecal-related errors. This should be the *only*
//! error enum that is publicly visible from the command line.

use thiserror::Error;

use super::{common::GlobError, merge::MergeArgsError};
use crate::{
    algorithm::AlgorithmError, constraints::ConstraintError, iov::IovParseError, label::LabelError,
    store::StoreError,
};

/// The *only* publicly visible error from millecal's command line. Messages
/// carry a hint where one helps.
#[derive(Error, Debug)]
pub enum MillecalError {
    /// An error related to the merge arguments.
    #[error("{0}")]
    Merge(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files must have a .toml or .json extension and use the same names as the command-line arguments, with underscores instead of dashes.")]
    ArgFile(String),

    /// An error reading or writing the conditions database.
    #[error("{0}\n\nThe local database directory holds database.txt and one JSON file per payload revision; check that they haven't been edited by hand.")]
    Store(String),

    /// An error related to global labels or constraints.
    #[error("{0}")]
    Constraints(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<MergeArgsError> for MillecalError {
    fn from(e: MergeArgsError) -> Self {
        Self::Merge(e.to_string())
    }
}

impl From<GlobError> for MillecalError {
    fn from(e: GlobError) -> Self {
        Self::Merge(e.to_string())
    }
}

impl From<IovParseError> for MillecalError {
    fn from(e: IovParseError) -> Self {
        Self::Merge(e.to_string())
    }
}

impl From<StoreError> for MillecalError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::IO(e) => Self::from(e),
            _ => Self::Store(e.to_string()),
        }
    }
}

impl From<AlgorithmError> for MillecalError {
    fn from(e: AlgorithmError) -> Self {
        match e {
            AlgorithmError::Store(e) => Self::from(e),
            AlgorithmError::NoOverlap { .. } => Self::Generic(e.to_string()),
        }
    }
}

impl From<LabelError> for MillecalError {
    fn from(e: LabelError) -> Self {
        Self::Constraints(e.to_string())
    }
}

impl From<ConstraintError> for MillecalError {
    fn from(e: ConstraintError) -> Self {
        match e {
            ConstraintError::Label(e) => Self::from(e),
            ConstraintError::IO(e) => Self::from(e),
        }
    }
}

impl From<toml::ser::Error> for MillecalError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ArgFile(e.to_string())
    }
}

impl From<std::io::Error> for MillecalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
