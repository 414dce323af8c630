// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with building global labels and element ids.

use thiserror::Error;

use super::Subsystem;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LabelError {
    #[error("Parameter id {param} doesn't fit in a global label (must be less than 100)")]
    ParameterOutOfRange { param: u16 },

    #[error("Element id {element} is not valid for subsystem {subsystem}")]
    InvalidElement { subsystem: Subsystem, element: u32 },

    #[error("{what} {value} is out of range (maximum is {max})")]
    FieldOutOfRange {
        what: &'static str,
        value: u32,
        max: u32,
    },
}
