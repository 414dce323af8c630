// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::{signed, CalibrationPayload, ConstantTable};
use crate::label::{GlobalLabel, RigidBodyParam, Subsystem, VxdId};

/// Rigid-body corrections per VXD sensor, in the sensor's local frame
/// (translations \[cm\], rotations \[rad\]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VxdAlignment {
    pub sensors: ConstantTable<VxdId>,
}

impl VxdAlignment {
    pub fn correction(&self, sensor: VxdId, param: RigidBodyParam) -> f64 {
        self.sensors.get(sensor, param.id())
    }
}

impl CalibrationPayload for VxdAlignment {
    type Element = VxdId;

    const SUBSYSTEM: Subsystem = Subsystem::Vxd;

    fn element_of(label: &GlobalLabel) -> Option<VxdId> {
        label.vxd_id()
    }

    fn get(&self, sensor: VxdId, param: u16) -> f64 {
        self.sensors.get(sensor, param)
    }

    fn add(&mut self, sensor: VxdId, param: u16, correction: f64, subtract: bool) {
        self.sensors.add(sensor, param, signed(correction, subtract));
    }
}
