// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::{signed, CalibrationPayload};
use crate::label::{BeamParam, GlobalLabel, Subsystem};

/// A position \[cm\].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Beam parameters. Only the interaction-point position is modelled; the
/// nominal value is the origin, which is a much rougher guess than the
/// nominal values of the alignment payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamParameters {
    pub vertex: Xyz,
}

impl BeamParameters {
    /// Shift one component of the vertex. Parameter kinds other than the
    /// three vertex components are ignored.
    pub fn add_to_vertex(&mut self, param: u16, correction: f64, subtract: bool) {
        let delta = signed(correction, subtract);
        match BeamParam::from_id(param) {
            Some(BeamParam::VertexX) => self.vertex.x += delta,
            Some(BeamParam::VertexY) => self.vertex.y += delta,
            Some(BeamParam::VertexZ) => self.vertex.z += delta,
            None => (),
        }
    }
}

impl CalibrationPayload for BeamParameters {
    type Element = ();

    const SUBSYSTEM: Subsystem = Subsystem::Beam;

    fn element_of(label: &GlobalLabel) -> Option<()> {
        label.is_beam().then_some(())
    }

    fn get(&self, _: (), param: u16) -> f64 {
        match BeamParam::from_id(param) {
            Some(BeamParam::VertexX) => self.vertex.x,
            Some(BeamParam::VertexY) => self.vertex.y,
            Some(BeamParam::VertexZ) => self.vertex.z,
            None => 0.0,
        }
    }

    fn add(&mut self, _: (), param: u16, correction: f64, subtract: bool) {
        self.add_to_vertex(param, correction, subtract);
    }
}
