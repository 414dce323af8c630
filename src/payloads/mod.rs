// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration payloads: the objects stored in a conditions database that
//! global-fit corrections are merged into.
//!
//! Every payload type can be default-constructed (nominal values, i.e. no
//! corrections), cloned, and corrected one constant at a time. Corrections
//! are additive deltas; with `subtract` set, the correction is subtracted
//! instead.

mod beam;
mod cdc;
mod klm;
mod table;
mod vxd;

pub use beam::{BeamParameters, Xyz};
pub use cdc::CdcCalibration;
pub use klm::KlmAlignment;
pub use table::ConstantTable;
pub use vxd::VxdAlignment;

use thiserror::Error;

use crate::label::{GlobalLabel, Subsystem};

/// Behaviour shared by all calibration payloads.
pub trait CalibrationPayload: Clone + Default + std::fmt::Debug + PartialEq {
    /// How the payload addresses one of its elements.
    type Element: Copy;

    const SUBSYSTEM: Subsystem;

    /// Get this payload's element out of a label. `None` if the label belongs
    /// to a different subsystem.
    fn element_of(label: &GlobalLabel) -> Option<Self::Element>;

    /// The current value of a constant.
    fn get(&self, element: Self::Element, param: u16) -> f64;

    /// Add `correction` to the constant (or subtract it, if `subtract` is
    /// set).
    fn add(&mut self, element: Self::Element, param: u16, correction: f64, subtract: bool);

    /// Apply a correction addressed by a global label. Returns `false` if the
    /// label doesn't belong to this payload.
    fn apply(&mut self, label: &GlobalLabel, correction: f64, subtract: bool) -> bool {
        match (Self::element_of(label), label.parameter_id()) {
            (Some(element), Some(param)) => {
                self.add(element, param, correction, subtract);
                true
            }
            _ => false,
        }
    }
}

pub(crate) fn signed(correction: f64, subtract: bool) -> f64 {
    if subtract {
        -correction
    } else {
        correction
    }
}

/// One payload of any of the supported subsystems.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Beam(BeamParameters),
    Vxd(VxdAlignment),
    Cdc(CdcCalibration),
    Klm(KlmAlignment),
}

impl Payload {
    /// A payload with nominal values.
    pub fn nominal(subsystem: Subsystem) -> Payload {
        match subsystem {
            Subsystem::Beam => Payload::Beam(BeamParameters::default()),
            Subsystem::Vxd => Payload::Vxd(VxdAlignment::default()),
            Subsystem::Cdc => Payload::Cdc(CdcCalibration::default()),
            Subsystem::Klm => Payload::Klm(KlmAlignment::default()),
        }
    }

    pub fn subsystem(&self) -> Subsystem {
        match self {
            Payload::Beam(_) => Subsystem::Beam,
            Payload::Vxd(_) => Subsystem::Vxd,
            Payload::Cdc(_) => Subsystem::Cdc,
            Payload::Klm(_) => Subsystem::Klm,
        }
    }

    /// Apply a correction addressed by a global label. Returns `false` if the
    /// label belongs to another subsystem.
    pub fn apply(&mut self, label: &GlobalLabel, correction: f64, subtract: bool) -> bool {
        match self {
            Payload::Beam(p) => p.apply(label, correction, subtract),
            Payload::Vxd(p) => p.apply(label, correction, subtract),
            Payload::Cdc(p) => p.apply(label, correction, subtract),
            Payload::Klm(p) => p.apply(label, correction, subtract),
        }
    }

    /// The value of the constant addressed by a label, or `None` if the label
    /// belongs to another subsystem.
    pub fn value_of(&self, label: &GlobalLabel) -> Option<f64> {
        fn get<P: CalibrationPayload>(p: &P, label: &GlobalLabel) -> Option<f64> {
            Some(p.get(P::element_of(label)?, label.parameter_id()?))
        }
        match self {
            Payload::Beam(p) => get(p, label),
            Payload::Vxd(p) => get(p, label),
            Payload::Cdc(p) => get(p, label),
            Payload::Klm(p) => get(p, label),
        }
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        let s = match self {
            Payload::Beam(p) => serde_json::to_string_pretty(p),
            Payload::Vxd(p) => serde_json::to_string_pretty(p),
            Payload::Cdc(p) => serde_json::to_string_pretty(p),
            Payload::Klm(p) => serde_json::to_string_pretty(p),
        }?;
        Ok(s)
    }

    pub fn from_json(subsystem: Subsystem, s: &str) -> Result<Payload, PayloadError> {
        let p = match subsystem {
            Subsystem::Beam => Payload::Beam(serde_json::from_str(s)?),
            Subsystem::Vxd => Payload::Vxd(serde_json::from_str(s)?),
            Subsystem::Cdc => Payload::Cdc(serde_json::from_str(s)?),
            Subsystem::Klm => Payload::Klm(serde_json::from_str(s)?),
        };
        Ok(p)
    }
}

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Couldn't (de)serialise payload: {0}")]
    Json(#[from] serde_json::Error),
}
