// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The global least-squares fit.
//!
//! The fit itself is done by an external solver (pede). This module only
//! describes what goes in (a [`Steering`]) and what comes out (a
//! [`FitResult`]); see [`pede`] for the implementations that talk to pede.

mod error;
pub mod pede;

pub use error::FitError;
pub use pede::{PedeExecutable, PedeResultFiles, Steering};

use crate::label::GlobalLabel;

/// The fit outcome for one global parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterResult {
    pub label: i64,

    /// Was this parameter actually determined by the fit? Fixed or unused
    /// parameters are not.
    pub determined: bool,

    pub correction: f64,
    pub error: f64,
}

impl ParameterResult {
    pub fn label(&self) -> GlobalLabel {
        GlobalLabel::classify(self.label)
    }
}

/// Everything a global fit produces. The order of `parameters` is only
/// meaningful for this fit; labels are the persistent identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitResult {
    pub success: bool,
    pub parameters: Vec<ParameterResult>,
}

impl FitResult {
    /// A result for a fit that didn't finish.
    pub fn failed() -> FitResult {
        FitResult::default()
    }

    pub fn num_determined(&self) -> usize {
        self.parameters.iter().filter(|p| p.determined).count()
    }
}

/// Something that can run a global fit.
pub trait GlobalFit {
    fn fit(&mut self, steering: &Steering) -> Result<FitResult, FitError>;
}

/// A fit that always returns the same result. Useful when the result is
/// already known, e.g. in tests.
impl GlobalFit for FitResult {
    fn fit(&mut self, _steering: &Steering) -> Result<FitResult, FitError> {
        Ok(self.clone())
    }
}
