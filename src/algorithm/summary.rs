// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::{
    fit::FitResult,
    label::{GlobalLabel, Subsystem},
};

/// The largest pull magnitude seen, and which parameter it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxPull {
    /// Signed.
    pub pull: f64,
    pub label: i64,
}

/// Everything later steps need to know about a fit result, gathered in one
/// pass over the determined parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitSummary {
    corrections: BTreeMap<Subsystem, Vec<(GlobalLabel, f64)>>,
    num_unrecognised: usize,
    n: usize,
    chi2: f64,
    max_pull: Option<MaxPull>,
}

impl FitSummary {
    pub fn new(result: &FitResult) -> FitSummary {
        let mut summary = FitSummary::default();
        for p in result.parameters.iter().filter(|p| p.determined) {
            let pull = p.correction / p.error;
            summary.n += 1;
            summary.chi2 += pull * pull;
            // Ties keep the first.
            if summary
                .max_pull
                .map_or(true, |m| pull.abs() > m.pull.abs())
            {
                summary.max_pull = Some(MaxPull {
                    pull,
                    label: p.label,
                });
            }

            let label = p.label();
            match label.subsystem() {
                Some(s) => summary
                    .corrections
                    .entry(s)
                    .or_default()
                    .push((label, p.correction)),
                None => summary.num_unrecognised += 1,
            }
        }
        summary
    }

    /// The number of determined parameters.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The sum of the squared pulls.
    pub fn chi2(&self) -> f64 {
        self.chi2
    }

    /// `None` if nothing was determined.
    pub fn chi2_per_ndf(&self) -> Option<f64> {
        (self.n > 0).then(|| self.chi2 / self.n as f64)
    }

    pub fn max_pull(&self) -> Option<MaxPull> {
        self.max_pull
    }

    pub fn count(&self, subsystem: Subsystem) -> usize {
        self.corrections.get(&subsystem).map_or(0, |c| c.len())
    }

    /// Determined parameters whose labels don't belong to any subsystem.
    pub fn num_unrecognised(&self) -> usize {
        self.num_unrecognised
    }

    /// The determined corrections of a subsystem, in fit order.
    pub fn corrections(&self, subsystem: Subsystem) -> &[(GlobalLabel, f64)] {
        self.corrections
            .get(&subsystem)
            .map(|c| c.as_slice())
            .unwrap_or_default()
    }

    /// Subsystems with at least one determined parameter.
    pub fn active_subsystems(&self) -> impl Iterator<Item = Subsystem> + '_ {
        Subsystem::iter().filter(|&s| self.count(s) > 0)
    }
}
