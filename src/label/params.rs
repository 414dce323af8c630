// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Named parameter kinds. Labels carry raw parameter ids; these enums give
//! the ids that the payloads know about a name.

use strum_macros::{Display, EnumIter};

/// Beam-parameter kinds. Only the interaction-point position is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BeamParam {
    VertexX = 1,
    VertexY = 2,
    VertexZ = 3,
}

/// Rigid-body corrections of a VXD sensor or a KLM module, in the element's
/// local frame: three translations and three rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RigidBodyParam {
    #[strum(serialize = "du")]
    Du = 1,
    #[strum(serialize = "dv")]
    Dv = 2,
    #[strum(serialize = "dw")]
    Dw = 3,
    #[strum(serialize = "dalpha")]
    Dalpha = 4,
    #[strum(serialize = "dbeta")]
    Dbeta = 5,
    #[strum(serialize = "dgamma")]
    Dgamma = 6,
}

/// CDC wire (or whole-layer) calibration constants. Positions are given at
/// the backward end-plate plus the forward-minus-backward difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CdcParam {
    BwdX = 1,
    BwdY = 2,
    BwdRotation = 6,
    FwdBwdX = 11,
    FwdBwdY = 12,
    FwdBwdRotation = 16,
    /// Drift-time offset.
    TimeZero = 30,
}

/// Alignment of a single CDC wire (not a whole layer): the wire-end
/// positions at each end-plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CdcWireParam {
    BwdX = 0,
    BwdY = 1,
    FwdX = 4,
    FwdY = 5,
}

macro_rules! param_ids {
    ($t:ty, $($variant:ident),+) => {
        impl $t {
            pub fn id(self) -> u16 {
                self as u16
            }

            pub fn from_id(id: u16) -> Option<$t> {
                $(
                    if id == <$t>::$variant as u16 {
                        return Some(<$t>::$variant);
                    }
                )+
                None
            }
        }
    };
}

param_ids!(BeamParam, VertexX, VertexY, VertexZ);
param_ids!(RigidBodyParam, Du, Dv, Dw, Dalpha, Dbeta, Dgamma);
param_ids!(
    CdcParam,
    BwdX,
    BwdY,
    BwdRotation,
    FwdBwdX,
    FwdBwdY,
    FwdBwdRotation,
    TimeZero
);
param_ids!(CdcWireParam, BwdX, BwdY, FwdX, FwdY);
