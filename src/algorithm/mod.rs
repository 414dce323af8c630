// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning a global fit into calibration payloads.
//!
//! The fit's corrections are decoded by label, merged into every payload
//! already valid for the data (or a nominal payload if there is none), and
//! the merged payloads are written back. Finally the fit quality decides
//! whether another iteration is needed.

mod gate;
mod summary;

pub use gate::AcceptanceGate;
pub use summary::{FitSummary, MaxPull};

use std::{collections::BTreeMap, fmt};

use log::{debug, error, info, warn};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    constants::PAYLOAD_QUERY_EVENT,
    fit::{GlobalFit, Steering},
    iov::{Iov, RunEnumerator},
    label::Subsystem,
    payloads::Payload,
    store::{ConditionsStore, StoreError},
};

/// What should happen next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The fit converged; its payloads are final.
    Accept,

    /// The payloads were written, but the fit should be run again on top of
    /// them.
    Iterate,

    /// Nothing was written.
    Failure(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NoInputFiles,
    NoRuns,
    FitError(String),
    FitUnsuccessful,
    NoParameters,
    NothingDetermined,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoInputFiles => write!(f, "no input files"),
            FailureReason::NoRuns => write!(f, "no runs in the input data"),
            FailureReason::FitError(e) => write!(f, "the global fit couldn't be run: {e}"),
            FailureReason::FitUnsuccessful => write!(f, "the global fit was not successful"),
            FailureReason::NoParameters => write!(f, "the global fit returned no parameters"),
            FailureReason::NothingDetermined => {
                write!(f, "the global fit didn't determine any parameters")
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "accept"),
            Verdict::Iterate => write!(f, "iterate"),
            Verdict::Failure(r) => write!(f, "failure ({r})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    pub verdict: Verdict,

    /// `None` if the fit result was never summarised.
    pub summary: Option<FitSummary>,

    /// What was written to the store, in order.
    pub written: Vec<(Subsystem, Iov)>,
}

impl CalibrationOutcome {
    fn failure(reason: FailureReason, summary: Option<FitSummary>) -> CalibrationOutcome {
        error!("Calibration failed: {reason}");
        CalibrationOutcome {
            verdict: Verdict::Failure(reason),
            summary,
            written: vec![],
        }
    }
}

#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("Payload {subsystem} valid for {iov} doesn't overlap with the data ({data_iov})")]
    NoOverlap {
        subsystem: Subsystem,
        iov: Iov,
        data_iov: Iov,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The Millepede calibration algorithm.
#[derive(Debug, Clone, Default)]
pub struct MillepedeAlgorithm {
    /// Subtract the fitted corrections instead of adding them.
    pub invert_sign: bool,

    pub gate: AcceptanceGate,
}

impl MillepedeAlgorithm {
    /// Run the global fit and merge its corrections into the store.
    ///
    /// A failure verdict guarantees nothing was written. An `Err` means the
    /// store couldn't be read or written.
    pub fn calibrate<R, F, S>(
        &self,
        steering: &Steering,
        runs: &R,
        fit: &mut F,
        store: &mut S,
    ) -> Result<CalibrationOutcome, AlgorithmError>
    where
        R: RunEnumerator + ?Sized,
        F: GlobalFit + ?Sized,
        S: ConditionsStore + ?Sized,
    {
        if steering.files.is_empty() {
            return Ok(CalibrationOutcome::failure(
                FailureReason::NoInputFiles,
                None,
            ));
        }
        let runs = runs.runs();
        let data_iov = match Iov::spanning(&runs) {
            Some(iov) => iov,
            None => return Ok(CalibrationOutcome::failure(FailureReason::NoRuns, None)),
        };
        info!(
            "{} input files, {} runs spanning {data_iov}",
            steering.files.len(),
            runs.len()
        );

        let result = match fit.fit(steering) {
            Ok(r) => r,
            Err(e) => {
                return Ok(CalibrationOutcome::failure(
                    FailureReason::FitError(e.to_string()),
                    None,
                ))
            }
        };
        if !result.success {
            return Ok(CalibrationOutcome::failure(
                FailureReason::FitUnsuccessful,
                None,
            ));
        }
        if result.parameters.is_empty() {
            return Ok(CalibrationOutcome::failure(
                FailureReason::NoParameters,
                None,
            ));
        }

        let summary = FitSummary::new(&result);
        info!(
            "{} of {} parameters determined",
            summary.n(),
            result.parameters.len()
        );
        if summary.n() == 0 {
            return Ok(CalibrationOutcome::failure(
                FailureReason::NothingDetermined,
                Some(summary),
            ));
        }
        for subsystem in Subsystem::iter() {
            match summary.count(subsystem) {
                0 => warn!("No {subsystem} parameters were determined"),
                c => info!("{c} {subsystem} parameters determined"),
            }
        }
        if summary.num_unrecognised() > 0 {
            warn!(
                "{} determined parameters have unrecognised labels and are ignored",
                summary.num_unrecognised()
            );
        }

        // Fetch, correct and clone every payload before writing any of them.
        let mut corrected = vec![];
        for subsystem in summary.active_subsystems() {
            let mut payloads: BTreeMap<Iov, Payload> = BTreeMap::new();
            for &exp_run in &runs {
                if let Some((payload, iov)) =
                    store.get_payload(subsystem, exp_run, PAYLOAD_QUERY_EVENT)?
                {
                    payloads
                        .entry(iov)
                        .or_insert_with(|| payload.into_owned());
                }
            }

            if payloads.is_empty() {
                let msg = format!(
                    "No {} payload found for the data; starting from nominal values for {data_iov}",
                    subsystem.payload_name()
                );
                if subsystem == Subsystem::Beam {
                    error!("{msg}");
                } else {
                    info!("{msg}");
                }
                payloads.insert(data_iov, Payload::nominal(subsystem));
            }
            debug!(
                "{subsystem}: {} payload(s) to correct",
                payloads.len()
            );

            for (label, correction) in summary.corrections(subsystem) {
                for payload in payloads.values_mut() {
                    payload.apply(label, *correction, self.invert_sign);
                }
            }

            for (iov, payload) in payloads {
                let write_iov = iov
                    .intersection(&data_iov)
                    .ok_or(AlgorithmError::NoOverlap {
                        subsystem,
                        iov,
                        data_iov,
                    })?;
                corrected.push((subsystem, payload, write_iov));
            }
        }

        let mut written = vec![];
        for (subsystem, payload, iov) in corrected {
            info!("Writing {} for {iov}", subsystem.payload_name());
            store.put_payload(payload, iov)?;
            written.push((subsystem, iov));
        }

        let verdict = self.gate.evaluate(&summary);
        Ok(CalibrationOutcome {
            verdict,
            summary: Some(summary),
            written,
        })
    }
}
