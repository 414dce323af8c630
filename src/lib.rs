// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Merge Millepede global-alignment results into detector calibration payloads.

A global fit (pede) solves for corrections to many calibration constants at
once. Each correction carries a [`label::GlobalLabel`] that says which payload,
element and parameter it belongs to. [`algorithm::MillepedeAlgorithm`] decodes
the labels, applies the corrections to the payloads already in a
[`store::ConditionsStore`] and decides whether the result is good enough to
stop iterating.
 */

pub mod algorithm;
mod cli;
pub mod constants;
pub mod constraints;
pub mod fit;
pub mod iov;
pub mod label;
pub mod payloads;
pub mod store;

// Re-exports.
pub use algorithm::{FailureReason, MillepedeAlgorithm, Verdict};
pub use cli::{Millecal, MillecalError};
pub use label::{GlobalLabel, Subsystem};
