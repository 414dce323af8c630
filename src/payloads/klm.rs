// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::{signed, CalibrationPayload, ConstantTable};
use crate::label::{GlobalLabel, KlmModuleId, RigidBodyParam, Subsystem};

/// Rigid-body corrections per KLM module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KlmAlignment {
    pub modules: ConstantTable<KlmModuleId>,
}

impl KlmAlignment {
    pub fn correction(&self, module: KlmModuleId, param: RigidBodyParam) -> f64 {
        self.modules.get(module, param.id())
    }
}

impl CalibrationPayload for KlmAlignment {
    type Element = KlmModuleId;

    const SUBSYSTEM: Subsystem = Subsystem::Klm;

    fn element_of(label: &GlobalLabel) -> Option<KlmModuleId> {
        label.klm_module()
    }

    fn get(&self, module: KlmModuleId, param: u16) -> f64 {
        self.modules.get(module, param)
    }

    fn add(&mut self, module: KlmModuleId, param: u16, correction: f64, subtract: bool) {
        self.modules.add(module, param, signed(correction, subtract));
    }
}
