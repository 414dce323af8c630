// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Global labels: integers that tie one fitted correction to one calibration
//! constant.
//!
//! A label is laid out in decimal as
//!
//! ```text
//! label = (unique_id * 10_000_000 + element) * 100 + parameter
//! ```
//!
//! where `unique_id` identifies the calibration payload (and hence the
//! subsystem), `element` is a subsystem-specific element identifier (a VXD
//! sensor, a CDC wire, a KLM module) and `parameter` says which constant of
//! that element is meant. Labels are assigned upstream, when derivatives are
//! collected; here they are mostly decoded.

mod element;
mod error;
mod params;
#[cfg(test)]
mod tests;

pub use element::{KlmModuleId, KlmSubdetector, VxdId, WireId};
pub use error::LabelError;
pub use params::{BeamParam, CdcParam, CdcWireParam, RigidBodyParam};

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::{LABEL_ELEMENT_RANGE, LABEL_MAX_UNIQUE_ID, LABEL_PARAM_RANGE};

/// The detector subsystems whose calibration payloads can be updated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Subsystem {
    /// Beam parameters (interaction-point position).
    #[strum(serialize = "Beam")]
    Beam,

    /// Vertex detector (PXD and SVD) sensor alignment.
    #[strum(serialize = "VXD")]
    Vxd,

    /// Central drift chamber wire calibration.
    #[strum(serialize = "CDC")]
    Cdc,

    /// K-long and muon detector module alignment.
    #[strum(serialize = "KLM")]
    Klm,
}

impl Subsystem {
    /// The unique id of this subsystem's payload, as embedded in labels.
    pub const fn unique_id(self) -> i64 {
        match self {
            Subsystem::Beam => 1,
            Subsystem::Vxd => 10,
            Subsystem::Cdc => 27,
            Subsystem::Klm => 30,
        }
    }

    pub fn from_unique_id(unique_id: i64) -> Option<Subsystem> {
        match unique_id {
            1 => Some(Subsystem::Beam),
            10 => Some(Subsystem::Vxd),
            27 => Some(Subsystem::Cdc),
            30 => Some(Subsystem::Klm),
            _ => None,
        }
    }

    /// The name under which this subsystem's payload is stored in a
    /// conditions database.
    pub const fn payload_name(self) -> &'static str {
        match self {
            Subsystem::Beam => "BeamParameters",
            Subsystem::Vxd => "VXDAlignment",
            Subsystem::Cdc => "CDCCalibration",
            Subsystem::Klm => "KLMAlignment",
        }
    }

    pub fn from_payload_name(name: &str) -> Option<Subsystem> {
        match name {
            "BeamParameters" => Some(Subsystem::Beam),
            "VXDAlignment" => Some(Subsystem::Vxd),
            "CDCCalibration" => Some(Subsystem::Cdc),
            "KLMAlignment" => Some(Subsystem::Klm),
            _ => None,
        }
    }

    /// Is this element id valid for this subsystem?
    fn accepts_element(self, element: u32) -> bool {
        match self {
            Subsystem::Beam => element == 0,
            Subsystem::Vxd => u16::try_from(element).is_ok(),
            Subsystem::Cdc => WireId::from_encoded(element).is_some(),
            Subsystem::Klm => KlmModuleId::from_encoded(element).is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Decoded {
    subsystem: Subsystem,
    element: u32,
    param: u16,
}

/// A classified global label. Classification never fails; a label that
/// doesn't belong to any known subsystem answers `false` to every predicate
/// and `None` to every accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalLabel {
    raw: i64,
    decoded: Option<Decoded>,
}

impl GlobalLabel {
    /// Classify a raw label.
    pub fn classify(raw: i64) -> GlobalLabel {
        GlobalLabel {
            raw,
            decoded: decode(raw),
        }
    }

    /// Build the label for a constant. The element must be valid for the
    /// subsystem (see [`Subsystem`]) and the parameter id must be below 100.
    pub fn construct(
        subsystem: Subsystem,
        element: u32,
        param: u16,
    ) -> Result<GlobalLabel, LabelError> {
        if i64::from(param) >= LABEL_PARAM_RANGE {
            return Err(LabelError::ParameterOutOfRange { param });
        }
        if i64::from(element) >= LABEL_ELEMENT_RANGE || !subsystem.accepts_element(element) {
            return Err(LabelError::InvalidElement { subsystem, element });
        }

        let raw = (subsystem.unique_id() * LABEL_ELEMENT_RANGE + i64::from(element))
            * LABEL_PARAM_RANGE
            + i64::from(param);
        Ok(GlobalLabel {
            raw,
            decoded: Some(Decoded {
                subsystem,
                element,
                param,
            }),
        })
    }

    pub fn beam(param: BeamParam) -> GlobalLabel {
        GlobalLabel::construct_unchecked(Subsystem::Beam, 0, param.id())
    }

    pub fn vxd(sensor: VxdId, param: RigidBodyParam) -> GlobalLabel {
        GlobalLabel::construct_unchecked(Subsystem::Vxd, u32::from(sensor.id()), param.id())
    }

    pub fn cdc(wire: WireId, param: CdcParam) -> GlobalLabel {
        GlobalLabel::construct_unchecked(Subsystem::Cdc, wire.encoded(), param.id())
    }

    /// A wire-by-wire alignment parameter. These share the CDC payload with
    /// the layer parameters and are told apart by the element: a real wire
    /// rather than wire 511.
    pub fn cdc_wire(wire: WireId, param: CdcWireParam) -> GlobalLabel {
        GlobalLabel::construct_unchecked(Subsystem::Cdc, wire.encoded(), param.id())
    }

    pub fn klm(module: KlmModuleId, param: RigidBodyParam) -> GlobalLabel {
        GlobalLabel::construct_unchecked(Subsystem::Klm, module.encoded(), param.id())
    }

    // Typed element ids and parameter enums are always in range.
    fn construct_unchecked(subsystem: Subsystem, element: u32, param: u16) -> GlobalLabel {
        let raw = (subsystem.unique_id() * LABEL_ELEMENT_RANGE + i64::from(element))
            * LABEL_PARAM_RANGE
            + i64::from(param);
        GlobalLabel {
            raw,
            decoded: Some(Decoded {
                subsystem,
                element,
                param,
            }),
        }
    }

    /// The original integer.
    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn subsystem(&self) -> Option<Subsystem> {
        self.decoded.map(|d| d.subsystem)
    }

    pub fn is_beam(&self) -> bool {
        self.subsystem() == Some(Subsystem::Beam)
    }

    pub fn is_vxd(&self) -> bool {
        self.subsystem() == Some(Subsystem::Vxd)
    }

    pub fn is_cdc(&self) -> bool {
        self.subsystem() == Some(Subsystem::Cdc)
    }

    pub fn is_klm(&self) -> bool {
        self.subsystem() == Some(Subsystem::Klm)
    }

    /// The subsystem-specific element id.
    pub fn element_id(&self) -> Option<u32> {
        self.decoded.map(|d| d.element)
    }

    /// The subsystem-specific parameter id.
    pub fn parameter_id(&self) -> Option<u16> {
        self.decoded.map(|d| d.param)
    }

    pub fn vxd_id(&self) -> Option<VxdId> {
        match self.decoded {
            Some(Decoded {
                subsystem: Subsystem::Vxd,
                element,
                ..
            }) => u16::try_from(element).ok().map(VxdId::from_id),
            _ => None,
        }
    }

    pub fn wire_id(&self) -> Option<WireId> {
        match self.decoded {
            Some(Decoded {
                subsystem: Subsystem::Cdc,
                element,
                ..
            }) => WireId::from_encoded(element),
            _ => None,
        }
    }

    pub fn klm_module(&self) -> Option<KlmModuleId> {
        match self.decoded {
            Some(Decoded {
                subsystem: Subsystem::Klm,
                element,
                ..
            }) => KlmModuleId::from_encoded(element),
            _ => None,
        }
    }
}

impl fmt::Display for GlobalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decoded {
            None => write!(f, "{} (unrecognised)", self.raw),
            Some(Decoded {
                subsystem,
                element,
                param,
            }) => {
                write!(f, "{} ({subsystem} ", self.raw)?;
                match subsystem {
                    Subsystem::Beam => write!(f, "vertex")?,
                    Subsystem::Vxd => match u16::try_from(element) {
                        Ok(id) => write!(f, "sensor {}", VxdId::from_id(id))?,
                        Err(_) => write!(f, "element {element}")?,
                    },
                    Subsystem::Cdc => match WireId::from_encoded(element) {
                        Some(w) => write!(f, "wire {w}")?,
                        None => write!(f, "element {element}")?,
                    },
                    Subsystem::Klm => match KlmModuleId::from_encoded(element) {
                        Some(m) => write!(f, "module {m}")?,
                        None => write!(f, "element {element}")?,
                    },
                }
                write!(f, ", parameter {param})")
            }
        }
    }
}

fn decode(raw: i64) -> Option<Decoded> {
    if raw <= 0 {
        return None;
    }

    let param = raw % LABEL_PARAM_RANGE;
    let element = (raw / LABEL_PARAM_RANGE) % LABEL_ELEMENT_RANGE;
    let unique_id = raw / (LABEL_PARAM_RANGE * LABEL_ELEMENT_RANGE);
    if unique_id > LABEL_MAX_UNIQUE_ID {
        return None;
    }

    let subsystem = Subsystem::from_unique_id(unique_id)?;
    // Both values are bounded by the modulo operations above.
    let element = u32::try_from(element).ok()?;
    let param = u16::try_from(param).ok()?;
    if !subsystem.accepts_element(element) {
        return None;
    }

    Some(Decoded {
        subsystem,
        element,
        param,
    })
}
