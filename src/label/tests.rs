// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use strum::IntoEnumIterator;

use super::*;

fn num_true_predicates(label: &GlobalLabel) -> usize {
    [
        label.is_beam(),
        label.is_vxd(),
        label.is_cdc(),
        label.is_klm(),
    ]
    .into_iter()
    .filter(|&b| b)
    .count()
}

#[test]
fn test_beam_labels_round_trip() {
    for param in BeamParam::iter() {
        let label = GlobalLabel::classify(GlobalLabel::beam(param).raw());
        assert!(label.is_beam());
        assert_eq!(num_true_predicates(&label), 1);
        assert_eq!(label.element_id(), Some(0));
        assert_eq!(label.parameter_id(), Some(param.id()));
        assert_eq!(BeamParam::from_id(param.id()), Some(param));
    }
    // The layout is decimal, so these are easy to write down.
    assert_eq!(GlobalLabel::beam(BeamParam::VertexX).raw(), 1_000_000_001);
    assert_eq!(GlobalLabel::beam(BeamParam::VertexZ).raw(), 1_000_000_003);
}

#[test]
fn test_vxd_labels_round_trip() {
    for layer in 1..=6 {
        for ladder in 1..=16 {
            for sensor in 1..=5 {
                let sensor_id = VxdId::new(layer, ladder, sensor).unwrap();
                for param in RigidBodyParam::iter() {
                    let raw = GlobalLabel::vxd(sensor_id, param).raw();
                    let label = GlobalLabel::classify(raw);
                    assert!(label.is_vxd(), "{raw}");
                    assert_eq!(num_true_predicates(&label), 1);
                    assert_eq!(label.vxd_id(), Some(sensor_id));
                    assert_eq!(label.parameter_id(), Some(param.id()));
                    assert_eq!(label.raw(), raw);
                }
            }
        }
    }
}

#[test]
fn test_cdc_labels_round_trip() {
    for layer in 0..56 {
        let num_wires = crate::constants::CDC_WIRES_IN_LAYER[layer as usize];
        for wire in (0..num_wires).chain(std::iter::once(511)) {
            let wire_id = WireId::from_continuous(layer, wire).unwrap();
            assert_eq!(wire_id.continuous_layer(), layer);
            for param in CdcParam::iter() {
                let raw = GlobalLabel::cdc(wire_id, param).raw();
                let label = GlobalLabel::classify(raw);
                assert!(label.is_cdc(), "{raw}");
                assert_eq!(num_true_predicates(&label), 1);
                assert_eq!(label.wire_id(), Some(wire_id));
                assert_eq!(label.parameter_id(), Some(param.id()));
            }
        }
    }
}

#[test]
fn test_cdc_wire_labels() {
    let wire = WireId::from_continuous(55, 383).unwrap();
    let ids: Vec<u16> = CdcWireParam::iter()
        .map(|param| {
            let label = GlobalLabel::classify(GlobalLabel::cdc_wire(wire, param).raw());
            assert!(label.is_cdc());
            assert_eq!(label.wire_id(), Some(wire));
            label.parameter_id().unwrap()
        })
        .collect();
    assert_eq!(ids, vec![0, 1, 4, 5]);
    assert_eq!(
        GlobalLabel::cdc_wire(wire, CdcWireParam::FwdY).raw(),
        GlobalLabel::construct(Subsystem::Cdc, wire.encoded(), 5).unwrap().raw()
    );
}

#[test]
fn test_klm_labels_round_trip() {
    for (subdetector, num_sections, num_sectors, num_layers) in [
        (KlmSubdetector::Bklm, 2, 8, 15),
        (KlmSubdetector::Eklm, 2, 4, 14),
    ] {
        for section in 0..num_sections {
            for sector in 1..=num_sectors {
                for layer in 1..=num_layers {
                    let module = KlmModuleId::new(subdetector, section, sector, layer).unwrap();
                    for param in RigidBodyParam::iter() {
                        let label = GlobalLabel::classify(GlobalLabel::klm(module, param).raw());
                        assert!(label.is_klm());
                        assert_eq!(num_true_predicates(&label), 1);
                        assert_eq!(label.klm_module(), Some(module));
                        assert_eq!(label.parameter_id(), Some(param.id()));
                    }
                }
            }
        }
    }
}

#[test]
fn test_construct_matches_typed_constructors() {
    let sensor = VxdId::new(3, 2, 1).unwrap();
    let typed = GlobalLabel::vxd(sensor, RigidBodyParam::Dgamma);
    let generic =
        GlobalLabel::construct(Subsystem::Vxd, u32::from(sensor.id()), RigidBodyParam::Dgamma.id())
            .unwrap();
    assert_eq!(typed, generic);

    let result = GlobalLabel::construct(Subsystem::Beam, 0, 100);
    assert_eq!(result, Err(LabelError::ParameterOutOfRange { param: 100 }));
    let result = GlobalLabel::construct(Subsystem::Beam, 4, 1);
    assert!(matches!(result, Err(LabelError::InvalidElement { .. })));
    // Layer 0 of superlayer 0 only has 160 wires.
    let result = GlobalLabel::construct(Subsystem::Cdc, 200, 1);
    assert!(matches!(result, Err(LabelError::InvalidElement { .. })));
}

#[test]
fn test_unrecognised_labels() {
    let unknown_unique_id = (5 * 10_000_000 + 12) * 100 + 1;
    let beam_with_element = (10_000_000 + 7) * 100 + 1;
    let cdc_bad_wire = (27 * 10_000_000 + 600) * 100 + 1;
    let klm_bad_subdetector = (30 * 10_000_000 + (3 << 16)) * 100 + 1;
    let too_big = 200 * 10_000_000 * 100;
    for raw in [
        0,
        -1,
        -1_000_000_001,
        i64::MIN,
        i64::MAX,
        17,
        unknown_unique_id,
        beam_with_element,
        cdc_bad_wire,
        klm_bad_subdetector,
        too_big,
    ] {
        let label = GlobalLabel::classify(raw);
        assert_eq!(num_true_predicates(&label), 0, "{raw}");
        assert_eq!(label.subsystem(), None);
        assert_eq!(label.element_id(), None);
        assert_eq!(label.parameter_id(), None);
        assert_eq!(label.vxd_id(), None);
        assert_eq!(label.wire_id(), None);
        assert_eq!(label.klm_module(), None);
        assert_eq!(label.raw(), raw);
    }
}

#[test]
fn test_at_most_one_predicate() {
    // Sweep through a range that covers the boundaries between unique ids.
    for unique_id in 0..40 {
        for element in [0, 1, 8192, 10_511, 65_536 + 65, 131_072 + 4_225, 9_999_999] {
            for param in [0, 1, 6, 30, 99] {
                let raw = (unique_id * 10_000_000 + element) * 100 + param;
                let label = GlobalLabel::classify(raw);
                assert!(num_true_predicates(&label) <= 1);
                if num_true_predicates(&label) == 1 {
                    assert_eq!(label.subsystem().unwrap().unique_id(), unique_id);
                }
            }
        }
    }
}

#[test]
fn test_subsystem_names() {
    for subsystem in Subsystem::iter() {
        assert_eq!(
            Subsystem::from_payload_name(subsystem.payload_name()),
            Some(subsystem)
        );
        assert_eq!(
            Subsystem::from_unique_id(subsystem.unique_id()),
            Some(subsystem)
        );
    }
    assert_eq!(Subsystem::Vxd.to_string(), "VXD");
    assert_eq!("KLM".parse::<Subsystem>().unwrap(), Subsystem::Klm);
}

#[test]
fn test_element_ids() {
    let sensor = VxdId::new(4, 10, 2).unwrap();
    assert_eq!(sensor.layer(), 4);
    assert_eq!(sensor.ladder(), 10);
    assert_eq!(sensor.sensor(), 2);
    assert_eq!(sensor.segment(), 0);
    assert_eq!(sensor.to_string(), "4.10.2");
    assert!(VxdId::new(8, 1, 1).is_err());

    let wire = WireId::from_continuous(8, 5).unwrap();
    assert_eq!(wire.superlayer(), 1);
    assert_eq!(wire.encoded(), 10_005);
    assert_eq!(WireId::from_continuous(55, 383).unwrap().encoded(), 85_383);
    assert!(WireId::from_continuous(56, 0).is_err());
    assert!(WireId::from_continuous(0, 160).is_err());
    assert!(WireId::layer_of(20).unwrap().is_layer());

    let module = KlmModuleId::new(KlmSubdetector::Eklm, 1, 3, 12).unwrap();
    assert_eq!(KlmModuleId::from_encoded(module.encoded()), Some(module));
    assert_eq!(module.encoded(), (2 << 16) | (1 << 12) | (3 << 6) | 12);
}

#[test]
fn test_display() {
    let label = GlobalLabel::cdc(WireId::from_continuous(10, 3).unwrap(), CdcParam::TimeZero);
    assert_eq!(label.to_string(), "27001200330 (CDC wire 10/3, parameter 30)");
    assert_eq!(GlobalLabel::classify(-5).to_string(), "-5 (unrecognised)");
}
