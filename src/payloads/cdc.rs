// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::{signed, CalibrationPayload, ConstantTable};
use crate::label::{CdcParam, GlobalLabel, Subsystem, WireId};

/// CDC wire calibration: wire-end positions and drift-time offsets for single
/// wires, and positions for whole layers (addressed by wire 511).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdcCalibration {
    pub wires: ConstantTable<WireId>,
}

impl CdcCalibration {
    pub fn correction(&self, wire: WireId, param: CdcParam) -> f64 {
        self.wires.get(wire, param.id())
    }

    /// The drift-time offset of a wire \[ns\].
    pub fn time_zero(&self, wire: WireId) -> f64 {
        self.correction(wire, CdcParam::TimeZero)
    }
}

impl CalibrationPayload for CdcCalibration {
    type Element = WireId;

    const SUBSYSTEM: Subsystem = Subsystem::Cdc;

    fn element_of(label: &GlobalLabel) -> Option<WireId> {
        label.wire_id()
    }

    fn get(&self, wire: WireId, param: u16) -> f64 {
        self.wires.get(wire, param)
    }

    fn add(&mut self, wire: WireId, param: u16, correction: f64, subtract: bool) {
        self.wires.add(wire, param, signed(correction, subtract));
    }
}
