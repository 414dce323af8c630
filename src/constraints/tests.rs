// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::TempDir;

use super::*;
use crate::label::BeamParam;

/// The continuous layer and parameter of each entry, with its coefficient.
fn decoded(c: &Constraint) -> Vec<(u32, u16, f64)> {
    c.entries
        .iter()
        .map(|&(label, coeff)| {
            let label = GlobalLabel::classify(label);
            let wire = label.wire_id().unwrap();
            (wire.continuous_layer(), label.parameter_id().unwrap(), coeff)
        })
        .collect()
}

#[test]
fn test_time_zero_constraint() {
    let c = cdc_time_zero_constraint().unwrap();
    assert_eq!(c.entries.len(), 14336);
    assert!(c.entries.iter().all(|&(_, coeff)| coeff == 1.0));
    assert!(c.entries.iter().all(|&(label, _)| {
        let label = GlobalLabel::classify(label);
        label.is_cdc() && label.parameter_id() == Some(CdcParam::TimeZero.id())
    }));

    // First wire of the first layer, last wire of the last layer.
    let first = GlobalLabel::classify(c.entries[0].0).wire_id().unwrap();
    assert_eq!((first.continuous_layer(), first.wire()), (0, 0));
    let last = GlobalLabel::classify(c.entries[14335].0).wire_id().unwrap();
    assert_eq!((last.continuous_layer(), last.wire()), (55, 383));
}

#[test]
fn test_layer_constraints() {
    let all = CdcLayerConstraints::default().generate().unwrap();
    assert_eq!(all.len(), 6);
    for c in &all {
        assert_eq!(c.entries.len(), 56);
        for &(label, _) in &c.entries {
            assert!(GlobalLabel::classify(label).wire_id().unwrap().is_layer());
        }
    }

    let rigid = CdcLayerConstraints {
        rigid: true,
        twist: false,
        ..Default::default()
    }
    .generate()
    .unwrap();
    let params: Vec<u16> = rigid
        .iter()
        .map(|c| GlobalLabel::classify(c.entries[0].0).parameter_id().unwrap())
        .collect();
    assert_eq!(params, vec![1, 2, 6, 11, 12]);

    let twist = CdcLayerConstraints {
        rigid: false,
        twist: true,
        ..Default::default()
    }
    .generate()
    .unwrap();
    assert_eq!(twist.len(), 1);
    assert_eq!(
        GlobalLabel::classify(twist[0].entries[0].0).parameter_id(),
        Some(16)
    );

    let none = CdcLayerConstraints {
        rigid: false,
        twist: false,
        ..Default::default()
    };
    assert!(none.generate().unwrap().is_empty());
}

#[test]
fn test_superlayer_table_matches_wires() {
    let wires: Vec<u32> = CDC_SUPERLAYERS
        .iter()
        .flat_map(|sl| std::iter::repeat(sl.wires_per_layer).take(sl.num_layers as usize))
        .collect();
    assert_eq!(wires, CDC_WIRES_IN_LAYER.to_vec());
    assert_eq!(CDC_SUPERLAYERS.iter().filter(|sl| sl.is_stereo()).count(), 4);
}

#[test]
fn test_layer_z_offset_and_z_scale() {
    let constraints = CdcLayerConstraints {
        rigid: false,
        twist: false,
        z_offset: true,
        r_scale: false,
        z_scale: true,
    }
    .generate()
    .unwrap();
    assert_eq!(constraints.len(), 2);

    // Only the 4 stereo superlayers take part.
    let z_offset = decoded(&constraints[0]);
    assert_eq!(z_offset.len(), 24);
    assert!(z_offset.iter().all(|&(_, p, _)| p == CdcParam::BwdRotation.id()));
    let layers: Vec<u32> = z_offset.iter().map(|&(l, _, _)| l).collect();
    let expected: Vec<u32> = (8..14).chain(20..26).chain(32..38).chain(44..50).collect();
    assert_eq!(layers, expected);
    // Stereo angle times the wire radius, stepping from the inner to the
    // outer radius of the superlayer.
    assert_abs_diff_eq!(z_offset[0].2, 0.068 * 25.70, epsilon = 1e-12);
    assert_abs_diff_eq!(z_offset[1].2, 0.068 * 27.52, epsilon = 1e-12);
    assert_abs_diff_eq!(z_offset[5].2, 0.068 * 34.80, epsilon = 1e-12);
    assert_abs_diff_eq!(z_offset[6].2, -0.060 * 47.69, epsilon = 1e-12);
    assert_abs_diff_eq!(z_offset[23].2, -0.072 * 100.37, epsilon = 1e-12);

    let z_scale = decoded(&constraints[1]);
    assert_eq!(z_scale.len(), 24);
    assert!(z_scale.iter().all(|&(_, p, _)| p == CdcParam::FwdBwdRotation.id()));
    assert_abs_diff_eq!(z_scale[0].2, 0.068);
    assert_abs_diff_eq!(z_scale[6].2, -0.060);
    assert_abs_diff_eq!(z_scale[12].2, 0.064);
    assert_abs_diff_eq!(z_scale[18].2, -0.072);
}

#[test]
fn test_layer_r_scale() {
    let constraints = CdcLayerConstraints {
        rigid: false,
        twist: false,
        r_scale: true,
        ..Default::default()
    }
    .generate()
    .unwrap();
    assert_eq!(constraints.len(), 2);
    for (c, param) in constraints.iter().zip([CdcParam::BwdX, CdcParam::BwdY]) {
        let entries = decoded(c);
        assert_eq!(entries.len(), 56);
        for (layer, p, coeff) in entries {
            assert_eq!(p, param.id());
            let expected = if layer < 28 { -1.0 } else { 1.0 };
            assert_abs_diff_eq!(coeff, expected);
        }
    }
}

#[test]
fn test_r_scale_is_not_a_duplicate_of_rigid() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("cons.txt");
    let constraints = CdcLayerConstraints {
        r_scale: true,
        ..Default::default()
    }
    .generate()
    .unwrap();
    assert_eq!(constraints.len(), 8);
    // The r-scale sums share their labels with the rigid sums.
    assert_eq!(constraints[0].checksum(), constraints[6].checksum());
    assert_eq!(write_constraints(&file, &constraints).unwrap(), 8);
}

#[test]
fn test_wire_constraints() {
    let all = CdcWireConstraints::default().generate().unwrap();
    assert_eq!(all.len(), 4 * 56);

    let some = CdcWireConstraints {
        layers: vec![0, 55],
    }
    .generate()
    .unwrap();
    let summary: Vec<(u32, u16, usize)> = some
        .iter()
        .map(|c| {
            let entries = decoded(c);
            assert!(entries.iter().all(|&(l, p, coeff)| {
                l == entries[0].0 && p == entries[0].1 && coeff == 1.0
            }));
            (entries[0].0, entries[0].1, entries.len())
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, 0, 160),
            (55, 0, 384),
            (0, 1, 160),
            (55, 1, 384),
            (0, 4, 160),
            (55, 4, 384),
            (0, 5, 160),
            (55, 5, 384),
        ]
    );
    // Real wires, not the whole-layer wire.
    let first = GlobalLabel::classify(some[0].entries[0].0).wire_id().unwrap();
    assert!(!first.is_layer());
    assert_eq!(first.wire(), 0);

    assert!(CdcWireConstraints { layers: vec![56] }.generate().is_err());
}

#[test]
fn test_checksum_ignores_coefficients() {
    let mut a = Constraint::new(0.0, "a");
    a.add(GlobalLabel::beam(BeamParam::VertexX), 1.0);
    a.add(GlobalLabel::beam(BeamParam::VertexY), 1.0);
    let mut b = Constraint::new(1.0, "b");
    b.add(GlobalLabel::beam(BeamParam::VertexX), 2.0);
    b.add(GlobalLabel::beam(BeamParam::VertexY), -3.0);
    let mut c = Constraint::new(0.0, "c");
    c.add(GlobalLabel::beam(BeamParam::VertexY), 1.0);
    c.add(GlobalLabel::beam(BeamParam::VertexX), 1.0);

    assert_eq!(a.checksum(), b.checksum());
    assert_ne!(a.checksum(), c.checksum());
}

#[test]
fn test_write_constraints() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("constraints.txt");

    let mut a = Constraint::new(0.0, "x and y");
    a.add(GlobalLabel::beam(BeamParam::VertexX), 1.0);
    a.add(GlobalLabel::beam(BeamParam::VertexY), 0.5);
    let mut dup = a.clone();
    dup.comment = "duplicate".to_string();
    dup.value = 7.0;
    let mut b = Constraint::new(1.5, "");
    b.add(GlobalLabel::beam(BeamParam::VertexZ), -1.0);

    // Same labels as `a`, different coefficients: not a duplicate.
    let mut scaled = a.clone();
    scaled.entries[1].1 = -0.5;

    let num_written = write_constraints(&file, &[a, dup, b, scaled]).unwrap();
    assert_eq!(num_written, 3);
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        indoc! {"
            ! x and y
            Constraint 0
            1000000001 1
            1000000002 0.5

            Constraint 1.5
            1000000003 -1

            ! x and y
            Constraint 0
            1000000001 1
            1000000002 -0.5

        "}
    );
}
