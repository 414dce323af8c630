// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{FailureReason, FitSummary, Verdict};
use crate::{
    constants::{DEFAULT_MAX_CHI2_PER_NDF, DEFAULT_MAX_PULL},
    label::GlobalLabel,
};

/// Decides whether a fit is good enough to stop iterating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceGate {
    /// Iterate if chi2 / n is at least this.
    pub max_chi2_per_ndf: f64,

    /// Iterate if any |pull| is greater than this.
    pub max_pull: f64,
}

impl Default for AcceptanceGate {
    fn default() -> Self {
        AcceptanceGate {
            max_chi2_per_ndf: DEFAULT_MAX_CHI2_PER_NDF,
            max_pull: DEFAULT_MAX_PULL,
        }
    }
}

impl AcceptanceGate {
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn evaluate(&self, summary: &FitSummary) -> Verdict {
        let chi2_per_ndf = match summary.chi2_per_ndf() {
            Some(c) => c,
            None => return Verdict::Failure(FailureReason::NothingDetermined),
        };

        // A NaN trips the gate.
        let chi2_tripped = !(chi2_per_ndf < self.max_chi2_per_ndf);
        if chi2_tripped {
            warn!(
                "chi2/ndf = {chi2_per_ndf} (chi2 = {}, n = {}) is not below {}",
                summary.chi2(),
                summary.n(),
                self.max_chi2_per_ndf
            );
        }

        let pull_tripped = match summary.max_pull() {
            Some(m) if !(m.pull.abs() <= self.max_pull) => {
                warn!(
                    "|pull| = {} of parameter {} is above {}",
                    m.pull.abs(),
                    GlobalLabel::classify(m.label),
                    self.max_pull
                );
                true
            }
            _ => false,
        };

        if chi2_tripped || pull_tripped {
            warn!("Another iteration is needed: {}", diagnostics(summary));
            Verdict::Iterate
        } else {
            info!("Accepted: {}", diagnostics(summary));
            Verdict::Accept
        }
    }
}

/// Both fit-quality numbers, with the label of the largest pull.
pub(super) fn diagnostics(summary: &FitSummary) -> String {
    let chi2 = match summary.chi2_per_ndf() {
        Some(c) => format!(
            "chi2/ndf = {c} (chi2 = {}, n = {})",
            summary.chi2(),
            summary.n()
        ),
        None => "no determined parameters".to_string(),
    };
    match summary.max_pull() {
        Some(m) => format!(
            "{chi2}, largest |pull| = {} of parameter {}",
            m.pull.abs(),
            GlobalLabel::classify(m.label)
        ),
        None => chi2,
    }
}
