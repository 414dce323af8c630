// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Experiment/run pairs and intervals of validity (IOVs).
//!
//! An IOV is an inclusive range of (experiment, run) pairs. Either end may be
//! open. The text form is `expLow,runLow,expHigh,runHigh`, where `-1` marks
//! an open bound; `expHigh,-1` means "until the last run of `expHigh`".

#[cfg(test)]
mod tests;

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One run of one experiment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ExpRun {
    pub exp: u32,
    pub run: u32,
}

impl ExpRun {
    pub const fn new(exp: u32, run: u32) -> ExpRun {
        ExpRun { exp, run }
    }

    /// The pair immediately after this one. Run `u32::MAX` stands for the
    /// end of an experiment.
    fn next(self) -> Option<ExpRun> {
        match self.run.checked_add(1) {
            Some(run) => Some(ExpRun::new(self.exp, run)),
            None => Some(ExpRun::new(self.exp.checked_add(1)?, 0)),
        }
    }

    /// The pair immediately before this one.
    fn previous(self) -> Option<ExpRun> {
        match self.run.checked_sub(1) {
            Some(run) => Some(ExpRun::new(self.exp, run)),
            None => Some(ExpRun::new(self.exp.checked_sub(1)?, u32::MAX)),
        }
    }
}

impl fmt::Display for ExpRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.exp, self.run)
    }
}

impl FromStr for ExpRun {
    type Err = IovParseError;

    /// Parse "exp,run" (a colon is also accepted as the separator).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.trim().split(|c: char| c == ',' || c == ':');
        let (exp, run) = match (split.next(), split.next(), split.next()) {
            (Some(e), Some(r), None) => (e, r),
            _ => return Err(IovParseError::BadExpRun(s.to_string())),
        };
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| IovParseError::BadExpRun(s.to_string()))
        };
        Ok(ExpRun::new(parse(exp)?, parse(run)?))
    }
}

/// An inclusive interval of validity. `None` bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Iov {
    first: Option<ExpRun>,
    last: Option<ExpRun>,
}

impl Iov {
    /// An interval from `first` to `last` inclusive. Returns `None` if `first`
    /// comes after `last`.
    pub fn new(first: Option<ExpRun>, last: Option<ExpRun>) -> Option<Iov> {
        match (first, last) {
            (Some(f), Some(l)) if f > l => None,
            _ => Some(Iov { first, last }),
        }
    }

    /// Valid for everything.
    pub const fn always() -> Iov {
        Iov {
            first: None,
            last: None,
        }
    }

    pub fn single_run(exp_run: ExpRun) -> Iov {
        Iov {
            first: Some(exp_run),
            last: Some(exp_run),
        }
    }

    /// The smallest interval containing every given run, or `None` if there
    /// are no runs.
    pub fn spanning<'a, I: IntoIterator<Item = &'a ExpRun>>(runs: I) -> Option<Iov> {
        let mut first: Option<ExpRun> = None;
        let mut last: Option<ExpRun> = None;
        for &r in runs {
            first = Some(first.map_or(r, |f| f.min(r)));
            last = Some(last.map_or(r, |l| l.max(r)));
        }
        Some(Iov {
            first: Some(first?),
            last: Some(last?),
        })
    }

    pub fn first(&self) -> Option<ExpRun> {
        self.first
    }

    pub fn last(&self) -> Option<ExpRun> {
        self.last
    }

    pub fn contains(&self, exp_run: ExpRun) -> bool {
        self.first.map_or(true, |f| f <= exp_run) && self.last.map_or(true, |l| exp_run <= l)
    }

    /// The overlap of two intervals, or `None` if they don't overlap.
    pub fn intersection(&self, other: &Iov) -> Option<Iov> {
        let first = match (self.first, other.first) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, None) => a,
            (None, b) => b,
        };
        let last = match (self.last, other.last) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, None) => a,
            (None, b) => b,
        };
        Iov::new(first, last)
    }

    pub fn overlaps(&self, other: &Iov) -> bool {
        self.intersection(other).is_some()
    }

    /// Shrink this interval so that it no longer overlaps `other`, keeping the
    /// side that holds `exp_run`. An interval not containing `exp_run` lies
    /// entirely before or after it, so the result is still one interval. If
    /// `other` contains `exp_run` (or doesn't overlap), nothing changes.
    pub fn clipped_around(&self, other: &Iov, exp_run: ExpRun) -> Iov {
        if !self.contains(exp_run) || other.contains(exp_run) || !self.overlaps(other) {
            return *self;
        }
        let mut clipped = *self;
        match (other.first, other.last) {
            (_, Some(l)) if l < exp_run => {
                if let Some(n) = l.next() {
                    clipped.first = Some(self.first.map_or(n, |f| f.max(n)));
                }
            }
            (Some(f), _) if exp_run < f => {
                if let Some(p) = f.previous() {
                    clipped.last = Some(self.last.map_or(p, |l| l.min(p)));
                }
            }
            _ => (),
        }
        clipped
    }

    /// Clip this interval by every interval in `later` (see
    /// [`Iov::clipped_around`]). This is the part of a stored interval that
    /// is still in effect around `exp_run` once later payloads shadow it.
    pub fn effective<I: IntoIterator<Item = Iov>>(&self, later: I, exp_run: ExpRun) -> Iov {
        later
            .into_iter()
            .fold(*self, |iov, other| iov.clipped_around(&other, exp_run))
    }
}

impl fmt::Display for Iov {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first {
            Some(ExpRun { exp, run }) => write!(f, "{exp},{run},")?,
            None => write!(f, "-1,-1,")?,
        }
        match self.last {
            Some(ExpRun { exp, run: u32::MAX }) => write!(f, "{exp},-1"),
            Some(ExpRun { exp, run }) => write!(f, "{exp},{run}"),
            None => write!(f, "-1,-1"),
        }
    }
}

impl FromStr for Iov {
    type Err = IovParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || IovParseError::BadIov(s.to_string());
        let fields = s
            .split(',')
            .map(|v| v.trim().parse::<i64>().map_err(|_| bad()))
            .collect::<Result<Vec<_>, _>>()?;
        let [exp_low, run_low, exp_high, run_high] = fields[..] else {
            return Err(bad());
        };
        let to_u32 = |v: i64| u32::try_from(v).map_err(|_| bad());

        let first = match (exp_low, run_low) {
            (-1, -1) => None,
            (e, -1) => Some(ExpRun::new(to_u32(e)?, 0)),
            (e, r) => Some(ExpRun::new(to_u32(e)?, to_u32(r)?)),
        };
        let last = match (exp_high, run_high) {
            (-1, -1) => None,
            (e, -1) => Some(ExpRun::new(to_u32(e)?, u32::MAX)),
            (e, r) => Some(ExpRun::new(to_u32(e)?, to_u32(r)?)),
        };
        Iov::new(first, last).ok_or_else(bad)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IovParseError {
    #[error("Couldn't parse '{0}' as an experiment and run (expected e.g. '12,345')")]
    BadExpRun(String),

    #[error("Couldn't parse '{0}' as an interval of validity (expected e.g. '12,0,12,-1')")]
    BadIov(String),
}

/// Something that knows which (experiment, run) pairs are present in the
/// input data.
pub trait RunEnumerator {
    fn runs(&self) -> BTreeSet<ExpRun>;

    /// The interval spanned by the input data.
    fn data_iov(&self) -> Option<Iov> {
        Iov::spanning(&self.runs())
    }
}

impl RunEnumerator for BTreeSet<ExpRun> {
    fn runs(&self) -> BTreeSet<ExpRun> {
        self.clone()
    }
}

impl RunEnumerator for [ExpRun] {
    fn runs(&self) -> BTreeSet<ExpRun> {
        self.iter().copied().collect()
    }
}

impl RunEnumerator for Vec<ExpRun> {
    fn runs(&self) -> BTreeSet<ExpRun> {
        self.as_slice().runs()
    }
}
