// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Decode global labels.

use clap::Parser;
use log::info;

use crate::{label::GlobalLabel, MillecalError};

#[derive(Parser, Debug)]
pub(super) struct LabelsArgs {
    /// The raw labels to decode.
    #[clap(name = "LABELS", required = true, allow_hyphen_values = true)]
    labels: Vec<i64>,
}

impl LabelsArgs {
    pub(super) fn run(self) -> Result<(), MillecalError> {
        for raw in self.labels {
            info!("{}", describe(GlobalLabel::classify(raw)));
        }
        Ok(())
    }
}

/// The decoded label and the payload it belongs to.
fn describe(label: GlobalLabel) -> String {
    match label.subsystem() {
        Some(s) => format!("{label} -> {}", s.payload_name()),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{BeamParam, CdcParam, WireId};

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(GlobalLabel::beam(BeamParam::VertexZ)),
            "1000000003 (Beam vertex, parameter 3) -> BeamParameters"
        );
        let wire = WireId::from_continuous(10, 3).unwrap();
        assert_eq!(
            describe(GlobalLabel::cdc(wire, CdcParam::TimeZero)),
            "27001200330 (CDC wire 10/3, parameter 30) -> CDCCalibration"
        );
        assert_eq!(describe(GlobalLabel::classify(-5)), "-5 (unrecognised)");
        assert_eq!(describe(GlobalLabel::classify(4)), "4 (unrecognised)");
    }

    #[test]
    fn test_negative_labels_parse() {
        let args = LabelsArgs::try_parse_from(["labels", "-5", "1000000003"]).unwrap();
        assert_eq!(args.labels, vec![-5, 1000000003]);
        assert!(LabelsArgs::try_parse_from(["labels"]).is_err());
    }
}
