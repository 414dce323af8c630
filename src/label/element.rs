// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Subsystem-specific element identifiers embedded in global labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::LabelError;
use crate::constants::{CDC_LAYER_WIRE, CDC_WIRES_IN_LAYER};

/// A VXD sensor id. 16 bits: layer (3), ladder (5), sensor (3) and segment
/// (5), most-significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VxdId(u16);

impl VxdId {
    const LAYER_SHIFT: u16 = 13;
    const LADDER_SHIFT: u16 = 8;
    const SENSOR_SHIFT: u16 = 5;

    pub fn new(layer: u8, ladder: u8, sensor: u8) -> Result<VxdId, LabelError> {
        check_field("VXD layer", layer.into(), 7)?;
        check_field("VXD ladder", ladder.into(), 31)?;
        check_field("VXD sensor", sensor.into(), 7)?;
        Ok(VxdId(
            u16::from(layer) << Self::LAYER_SHIFT
                | u16::from(ladder) << Self::LADDER_SHIFT
                | u16::from(sensor) << Self::SENSOR_SHIFT,
        ))
    }

    /// Any 16-bit pattern is a valid id.
    pub fn from_id(id: u16) -> VxdId {
        VxdId(id)
    }

    pub fn id(self) -> u16 {
        self.0
    }

    pub fn layer(self) -> u8 {
        (self.0 >> Self::LAYER_SHIFT) as u8 & 0x7
    }

    pub fn ladder(self) -> u8 {
        (self.0 >> Self::LADDER_SHIFT) as u8 & 0x1f
    }

    pub fn sensor(self) -> u8 {
        (self.0 >> Self::SENSOR_SHIFT) as u8 & 0x7
    }

    pub fn segment(self) -> u8 {
        self.0 as u8 & 0x1f
    }
}

impl fmt::Display for VxdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.layer(), self.ladder(), self.sensor())?;
        if self.segment() != 0 {
            write!(f, "#{}", self.segment())?;
        }
        Ok(())
    }
}

/// A CDC wire id, encoded as `superlayer * 10000 + layer * 1000 + wire`
/// where `layer` counts within the superlayer. Wire 511 addresses the whole
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WireId {
    superlayer: u8,
    layer: u8,
    wire: u16,
}

impl WireId {
    /// Superlayer 0 has 8 layers, the other 8 superlayers have 6 each.
    fn layers_in_superlayer(superlayer: u8) -> Option<u8> {
        match superlayer {
            0 => Some(8),
            1..=8 => Some(6),
            _ => None,
        }
    }

    /// Make a wire id from a continuous layer number (0 to 55) and a wire
    /// number within it. The wire must exist in the layer, or be 511.
    pub fn from_continuous(layer: u32, wire: u32) -> Result<WireId, LabelError> {
        let num_layers = CDC_WIRES_IN_LAYER.len() as u32;
        check_field("CDC layer", layer, num_layers - 1)?;
        let num_wires = CDC_WIRES_IN_LAYER[layer as usize];
        if wire != CDC_LAYER_WIRE {
            check_field("CDC wire", wire, num_wires - 1)?;
        }

        let (superlayer, layer_in_sl) = if layer < 8 {
            (0, layer)
        } else {
            (1 + (layer - 8) / 6, (layer - 8) % 6)
        };
        Ok(WireId {
            superlayer: superlayer as u8,
            layer: layer_in_sl as u8,
            wire: wire as u16,
        })
    }

    /// The id addressing a whole continuous layer.
    pub fn layer_of(layer: u32) -> Result<WireId, LabelError> {
        WireId::from_continuous(layer, CDC_LAYER_WIRE)
    }

    pub fn from_encoded(encoded: u32) -> Option<WireId> {
        let superlayer = u8::try_from(encoded / 10000).ok()?;
        let layer = ((encoded / 1000) % 10) as u8;
        let wire = encoded % 1000;
        if layer >= WireId::layers_in_superlayer(superlayer)? {
            return None;
        }
        let id = WireId {
            superlayer,
            layer,
            wire: wire as u16,
        };
        let max_wire = CDC_WIRES_IN_LAYER[id.continuous_layer() as usize];
        if wire != CDC_LAYER_WIRE && wire >= max_wire {
            return None;
        }
        Some(id)
    }

    pub fn encoded(self) -> u32 {
        u32::from(self.superlayer) * 10000 + u32::from(self.layer) * 1000 + u32::from(self.wire)
    }

    pub fn superlayer(self) -> u8 {
        self.superlayer
    }

    /// The layer number counted from the innermost layer (0 to 55).
    pub fn continuous_layer(self) -> u32 {
        match self.superlayer {
            0 => u32::from(self.layer),
            sl => 8 + (u32::from(sl) - 1) * 6 + u32::from(self.layer),
        }
    }

    pub fn wire(self) -> u16 {
        self.wire
    }

    /// Does this id address a whole layer rather than a single wire?
    pub fn is_layer(self) -> bool {
        u32::from(self.wire) == CDC_LAYER_WIRE
    }
}

impl TryFrom<u32> for WireId {
    type Error = LabelError;

    fn try_from(encoded: u32) -> Result<Self, Self::Error> {
        WireId::from_encoded(encoded).ok_or(LabelError::InvalidElement {
            subsystem: super::Subsystem::Cdc,
            element: encoded,
        })
    }
}

impl From<WireId> for u32 {
    fn from(w: WireId) -> u32 {
        w.encoded()
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_layer() {
            write!(f, "layer {}", self.continuous_layer())
        } else {
            write!(f, "{}/{}", self.continuous_layer(), self.wire)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KlmSubdetector {
    /// Barrel.
    Bklm = 1,
    /// Endcap.
    Eklm = 2,
}

/// A KLM module id: subdetector << 16 | section << 12 | sector << 6 | layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct KlmModuleId {
    subdetector: KlmSubdetector,
    section: u8,
    sector: u8,
    layer: u8,
}

impl KlmModuleId {
    pub fn new(
        subdetector: KlmSubdetector,
        section: u8,
        sector: u8,
        layer: u8,
    ) -> Result<KlmModuleId, LabelError> {
        check_field("KLM section", section.into(), 15)?;
        check_field("KLM sector", sector.into(), 63)?;
        check_field("KLM layer", layer.into(), 63)?;
        Ok(KlmModuleId {
            subdetector,
            section,
            sector,
            layer,
        })
    }

    pub fn from_encoded(encoded: u32) -> Option<KlmModuleId> {
        let subdetector = match encoded >> 16 {
            1 => KlmSubdetector::Bklm,
            2 => KlmSubdetector::Eklm,
            _ => return None,
        };
        Some(KlmModuleId {
            subdetector,
            section: ((encoded >> 12) & 0xf) as u8,
            sector: ((encoded >> 6) & 0x3f) as u8,
            layer: (encoded & 0x3f) as u8,
        })
    }

    pub fn encoded(self) -> u32 {
        (self.subdetector as u32) << 16
            | u32::from(self.section) << 12
            | u32::from(self.sector) << 6
            | u32::from(self.layer)
    }

    pub fn subdetector(self) -> KlmSubdetector {
        self.subdetector
    }

    pub fn section(self) -> u8 {
        self.section
    }

    pub fn sector(self) -> u8 {
        self.sector
    }

    pub fn layer(self) -> u8 {
        self.layer
    }
}

impl TryFrom<u32> for KlmModuleId {
    type Error = LabelError;

    fn try_from(encoded: u32) -> Result<Self, Self::Error> {
        KlmModuleId::from_encoded(encoded).ok_or(LabelError::InvalidElement {
            subsystem: super::Subsystem::Klm,
            element: encoded,
        })
    }
}

impl From<KlmModuleId> for u32 {
    fn from(m: KlmModuleId) -> u32 {
        m.encoded()
    }
}

impl fmt::Display for KlmModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sub = match self.subdetector {
            KlmSubdetector::Bklm => "BKLM",
            KlmSubdetector::Eklm => "EKLM",
        };
        write!(
            f,
            "{sub} section {} sector {} layer {}",
            self.section, self.sector, self.layer
        )
    }
}

fn check_field(what: &'static str, value: u32, max: u32) -> Result<(), LabelError> {
    if value > max {
        Err(LabelError::FieldOutOfRange { what, value, max })
    } else {
        Ok(())
    }
}
