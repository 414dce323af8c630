// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

The global-label layout constants are shared between the label codec and the
constraint generators; changing them changes the meaning of every label in
every pede input file ever written.
 */

use static_assertions::const_assert;

/// The number of distinct parameter ids per element. Parameter ids are the
/// least-significant decimal digits of a label.
pub const LABEL_PARAM_RANGE: i64 = 100;

/// The number of distinct element ids per subsystem.
pub const LABEL_ELEMENT_RANGE: i64 = 10_000_000;

/// The largest payload unique id that fits in a label.
pub const LABEL_MAX_UNIQUE_ID: i64 = 99;

// The largest label must fit comfortably inside an i64.
const_assert!(
    (LABEL_MAX_UNIQUE_ID + 1)
        .saturating_mul(LABEL_ELEMENT_RANGE)
        .saturating_mul(LABEL_PARAM_RANGE)
        < i64::MAX / 2
);

/// If the pooled chi-square of the pulls divided by the number of determined
/// parameters is greater than or equal to this, another iteration is
/// requested.
pub const DEFAULT_MAX_CHI2_PER_NDF: f64 = 1.0;

/// If any single pull magnitude is strictly greater than this, another
/// iteration is requested.
pub const DEFAULT_MAX_PULL: f64 = 50.0;

/// Payloads are queried at this event number of each run.
pub const PAYLOAD_QUERY_EVENT: u32 = 1;

/// pede exit codes up to and including this value mean the solve finished
/// (possibly with warnings).
pub const PEDE_MAX_SUCCESS_EXIT_CODE: i32 = 9;

/// The default pede solution method.
pub const DEFAULT_PEDE_METHOD: &str = "inversion 3 0.1";

/// The number of CDC wires in each of the 56 continuous layers.
pub const CDC_WIRES_IN_LAYER: [u32; 56] = [
    160, 160, 160, 160, 160, 160, 160, 160, //
    160, 160, 160, 160, 160, 160, //
    192, 192, 192, 192, 192, 192, //
    224, 224, 224, 224, 224, 224, //
    256, 256, 256, 256, 256, 256, //
    288, 288, 288, 288, 288, 288, //
    320, 320, 320, 320, 320, 320, //
    352, 352, 352, 352, 352, 352, //
    384, 384, 384, 384, 384, 384, //
];

/// Wire number used to address a whole CDC layer.
pub const CDC_LAYER_WIRE: u32 = 511;

/// One CDC superlayer, as far as constraints need to know it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdcSuperlayer {
    pub num_layers: u32,
    pub wires_per_layer: u32,

    /// Radius of the innermost layer's sense wires \[cm\].
    pub inner_radius: f64,

    /// Radius of the outermost layer's sense wires \[cm\].
    pub outer_radius: f64,

    /// Stereo angle \[rad\]. Zero for axial superlayers.
    pub stereo_angle: f64,
}

impl CdcSuperlayer {
    pub fn is_stereo(&self) -> bool {
        self.stereo_angle != 0.0
    }
}

const fn superlayer(
    num_layers: u32,
    wires_per_layer: u32,
    inner_radius: f64,
    outer_radius: f64,
    stereo_angle: f64,
) -> CdcSuperlayer {
    CdcSuperlayer {
        num_layers,
        wires_per_layer,
        inner_radius,
        outer_radius,
        stereo_angle,
    }
}

/// The nominal CDC superlayers, innermost (A1) first.
pub static CDC_SUPERLAYERS: [CdcSuperlayer; 9] = [
    superlayer(8, 160, 16.80, 23.80, 0.0),      // A1
    superlayer(6, 160, 25.70, 34.80, 0.068),    // U2
    superlayer(6, 192, 36.52, 45.57, 0.0),      // A3
    superlayer(6, 224, 47.69, 56.69, -0.060),   // V4
    superlayer(6, 256, 58.41, 67.41, 0.0),      // A5
    superlayer(6, 288, 69.53, 78.53, 0.064),    // U6
    superlayer(6, 320, 80.25, 89.25, 0.0),      // A7
    superlayer(6, 352, 91.37, 100.37, -0.072),  // V8
    superlayer(6, 384, 102.00, 111.14, 0.0),    // A9
];
