// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Linear constraints on global parameters.
//!
//! A constraint says `sum(coefficient_i * parameter_i) = value`. Without
//! them, a fit of e.g. every CDC layer's position is free to move the whole
//! detector. Only constraints that don't need any detector geometry are
//! generated here.

#[cfg(test)]
mod tests;

use std::{
    collections::{hash_map::DefaultHasher, HashMap},
    fs::File,
    hash::{Hash, Hasher},
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    constants::{CdcSuperlayer, CDC_SUPERLAYERS, CDC_WIRES_IN_LAYER},
    label::{CdcParam, CdcWireParam, GlobalLabel, LabelError, WireId},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    pub value: f64,
    pub comment: String,
    pub entries: Vec<(i64, f64)>,
}

impl Constraint {
    pub fn new(value: f64, comment: &str) -> Constraint {
        Constraint {
            value,
            comment: comment.to_string(),
            entries: vec![],
        }
    }

    pub fn add(&mut self, label: GlobalLabel, coefficient: f64) {
        self.entries.push((label.raw(), coefficient));
    }

    /// A checksum over the labels only; two constraints on the same
    /// parameters have the same checksum, whatever their coefficients.
    pub fn checksum(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (label, _) in &self.entries {
            label.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn write<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        if !self.comment.is_empty() {
            writeln!(w, "! {}", self.comment)?;
        }
        writeln!(w, "Constraint {}", self.value)?;
        for (label, coefficient) in &self.entries {
            writeln!(w, "{label} {coefficient}")?;
        }
        Ok(())
    }
}

/// The sum of the time-zero corrections of every CDC wire is zero.
pub fn cdc_time_zero_constraint() -> Result<Constraint, ConstraintError> {
    let mut constraint = Constraint::new(0.0, "CDC wire time zeros");
    for (layer, &num_wires) in (0..).zip(CDC_WIRES_IN_LAYER.iter()) {
        for wire in 0..num_wires {
            let wire = WireId::from_continuous(layer, wire)?;
            constraint.add(GlobalLabel::cdc(wire, CdcParam::TimeZero), 1.0);
        }
    }
    Ok(constraint)
}

/// Constraints on whole CDC layers (wire 511). The coefficients use only the
/// nominal superlayer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdcLayerConstraints {
    /// Fix the sum over all layers of the backward offsets and rotation and
    /// the forward-backward offsets.
    pub rigid: bool,

    /// Fix the sum over all layers of the forward-backward rotation.
    pub twist: bool,

    /// Fix the z offset of the stereo layers: their backward rotations
    /// weighted by stereo angle times wire radius.
    pub z_offset: bool,

    /// Fix the radial scale: the backward x and y offsets of the inner half
    /// of the layers against those of the outer half.
    pub r_scale: bool,

    /// Fix the z scale: the forward-backward rotations of the stereo layers
    /// weighted by stereo angle.
    pub z_scale: bool,
}

impl Default for CdcLayerConstraints {
    fn default() -> Self {
        CdcLayerConstraints {
            rigid: true,
            twist: true,
            z_offset: false,
            r_scale: false,
            z_scale: false,
        }
    }
}

/// Each continuous layer with its superlayer and its index within it.
fn cdc_layers() -> impl Iterator<Item = (u32, &'static CdcSuperlayer, u32)> {
    CDC_SUPERLAYERS
        .iter()
        .flat_map(|sl| (0..sl.num_layers).map(move |i| (sl, i)))
        .zip(0..)
        .map(|((sl, i), layer)| (layer, sl, i))
}

impl CdcLayerConstraints {
    const RIGID_PARAMS: [CdcParam; 5] = [
        CdcParam::BwdX,
        CdcParam::BwdY,
        CdcParam::BwdRotation,
        CdcParam::FwdBwdX,
        CdcParam::FwdBwdY,
    ];

    pub fn generate(&self) -> Result<Vec<Constraint>, ConstraintError> {
        let mut params = vec![];
        if self.rigid {
            params.extend(Self::RIGID_PARAMS);
        }
        if self.twist {
            params.push(CdcParam::FwdBwdRotation);
        }

        let mut constraints = vec![];
        for param in params {
            let comment = format!("CDC layers, {param}");
            constraints.push(layer_sum(&comment, param, |_, _, _| Some(1.0))?);
        }

        if self.z_offset {
            constraints.push(layer_sum(
                "CDC stereo layers, z offset",
                CdcParam::BwdRotation,
                |_, sl, i| {
                    if !sl.is_stereo() {
                        return None;
                    }
                    let dr = (sl.outer_radius - sl.inner_radius) / f64::from(sl.num_layers - 1);
                    let radius = sl.inner_radius + f64::from(i) * dr;
                    Some(sl.stereo_angle * radius)
                },
            )?);
        }

        if self.r_scale {
            let num_layers = CDC_WIRES_IN_LAYER.len() as f64;
            for param in [CdcParam::BwdX, CdcParam::BwdY] {
                constraints.push(layer_sum(
                    &format!("CDC layers, r scale, {param}"),
                    param,
                    |layer, _, _| {
                        // -1 for the inner half of the layers, +1 for the outer.
                        let position = 2.0 * f64::from(layer) + 0.5;
                        Some(if position < num_layers { -1.0 } else { 1.0 })
                    },
                )?);
            }
        }

        if self.z_scale {
            constraints.push(layer_sum(
                "CDC stereo layers, z scale",
                CdcParam::FwdBwdRotation,
                |_, sl, _| sl.is_stereo().then_some(sl.stereo_angle),
            )?);
        }

        Ok(constraints)
    }
}

/// A constraint over the layer labels of `param`. `coefficient` gets the
/// continuous layer, its superlayer and the index within the superlayer;
/// layers it returns `None` for are left out.
fn layer_sum<F>(
    comment: &str,
    param: CdcParam,
    coefficient: F,
) -> Result<Constraint, ConstraintError>
where
    F: Fn(u32, &CdcSuperlayer, u32) -> Option<f64>,
{
    let mut constraint = Constraint::new(0.0, comment);
    for (layer, sl, i) in cdc_layers() {
        if let Some(c) = coefficient(layer, sl, i) {
            constraint.add(GlobalLabel::cdc(WireId::layer_of(layer)?, param), c);
        }
    }
    Ok(constraint)
}

/// Constraints on the wires of CDC layers, for fits that align wires and
/// layers together: in each layer, the sums of the wire-end x and y
/// corrections at each end-plate are zero, so coherent movements are left to
/// the layer parameters. (The rotation sums need wire positions and aren't
/// generated.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdcWireConstraints {
    /// Continuous layer numbers.
    pub layers: Vec<u32>,
}

impl Default for CdcWireConstraints {
    fn default() -> Self {
        CdcWireConstraints {
            layers: (0..CDC_WIRES_IN_LAYER.len() as u32).collect(),
        }
    }
}

impl CdcWireConstraints {
    pub fn generate(&self) -> Result<Vec<Constraint>, ConstraintError> {
        let mut constraints = Vec::with_capacity(4 * self.layers.len());
        for param in CdcWireParam::iter() {
            for &layer in &self.layers {
                // Checks the layer number.
                WireId::layer_of(layer)?;
                let num_wires = CDC_WIRES_IN_LAYER[layer as usize];
                let mut constraint =
                    Constraint::new(0.0, &format!("CDC layer {layer} wires, {param}"));
                for wire in 0..num_wires {
                    let wire = WireId::from_continuous(layer, wire)?;
                    constraint.add(GlobalLabel::cdc_wire(wire, param), 1.0);
                }
                constraints.push(constraint);
            }
        }
        Ok(constraints)
    }
}

/// Write constraints to a Millepede constraint file. A constraint with the
/// same labels and coefficients as an earlier one is skipped; its value is
/// not compared. Returns how many were written.
pub fn write_constraints<P: AsRef<Path>>(
    file: P,
    constraints: &[Constraint],
) -> Result<usize, ConstraintError> {
    let file = file.as_ref();
    let mut w = BufWriter::new(File::create(file)?);
    // Constraints with the same checksum are only duplicates if their
    // coefficients also match.
    let mut seen: HashMap<u64, Vec<&Constraint>> = HashMap::new();
    let mut num_written = 0;
    for c in constraints {
        let same_labels = seen.entry(c.checksum()).or_default();
        if same_labels.iter().any(|s| s.entries == c.entries) {
            debug!("Skipping duplicate constraint '{}'", c.comment);
            continue;
        }
        same_labels.push(c);
        c.write(&mut w)?;
        writeln!(w)?;
        num_written += 1;
    }
    w.flush()?;
    debug!("Wrote {num_written} constraints to {}", file.display());
    Ok(num_written)
}

#[derive(Error, Debug)]
pub enum ConstraintError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
