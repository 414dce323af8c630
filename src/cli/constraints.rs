// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Write a Millepede constraint file for the CDC.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use super::common::{display_warnings, InfoPrinter, Warn};
use crate::{
    constraints::{
        cdc_time_zero_constraint, write_constraints, CdcLayerConstraints, CdcWireConstraints,
    },
    MillecalError,
};

const DEFAULT_CONSTRAINTS_FILENAME: &str = "cdc-constraints.txt";

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("The constraint file to write. Default: {DEFAULT_CONSTRAINTS_FILENAME}");
}

#[derive(Parser, Debug, Default)]
pub(super) struct ConstraintsArgs {
    #[clap(short, long, help = OUTPUT_HELP.as_str())]
    output: Option<PathBuf>,

    /// Don't constrain the sums of the layer offsets and backward rotations.
    #[clap(long)]
    no_rigid: bool,

    /// Don't constrain the sum of the layer forward-backward rotations.
    #[clap(long)]
    no_twist: bool,

    /// Also fix the z offset of the stereo layers.
    #[clap(long)]
    z_offset: bool,

    /// Also fix the radial scale of the layers.
    #[clap(long)]
    r_scale: bool,

    /// Also fix the z scale of the stereo layers.
    #[clap(long)]
    z_scale: bool,

    /// Also constrain the sums of the wire-end x and y corrections in every
    /// layer, for fits of individual wires.
    #[clap(long)]
    wires: bool,

    /// Also constrain the sum of all wire time-zero corrections.
    #[clap(long)]
    time_zeros: bool,
}

impl ConstraintsArgs {
    pub(super) fn run(self) -> Result<(), MillecalError> {
        let ConstraintsArgs {
            output,
            no_rigid,
            no_twist,
            z_offset,
            r_scale,
            z_scale,
            wires,
            time_zeros,
        } = self;
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_CONSTRAINTS_FILENAME));

        let mut constraints = CdcLayerConstraints {
            rigid: !no_rigid,
            twist: !no_twist,
            z_offset,
            r_scale,
            z_scale,
        }
        .generate()?;
        if wires {
            constraints.extend(CdcWireConstraints::default().generate()?);
        }
        if time_zeros {
            constraints.push(cdc_time_zero_constraint()?);
        }
        if constraints.is_empty() {
            "No constraints were selected; the constraint file will be empty".warn();
        }

        let num_written = write_constraints(&output, &constraints)?;
        let mut printer = InfoPrinter::new("Constraints written".into());
        printer.push_line(format!("{num_written} constraints").into());
        printer.push_line(format!("{}", output.display()).into());
        printer.display();
        display_warnings();
        info!("Use this file with 'merge --constraints'");
        Ok(())
    }
}
