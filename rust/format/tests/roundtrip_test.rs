// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write, read and validate complete models.

use approx::assert_relative_eq;
use nalgebra::{Matrix4, Vector3};
use xkt_lite_core::{EntityParams, ModelConfig, PrimitiveParams, Transform, XktModel};
use xkt_lite_format::{
    read_header, read_xkt, validate, validate_xkt, write_xkt, Codec, Element, Error, WriterConfig,
    XktWriter, ZlibCodec, NUM_ELEMENTS,
};

fn box_primitive(primitive_id: u32, origin: [f64; 3], size: f64, opacity: f64) -> PrimitiveParams {
    let mut positions = Vec::new();
    for i in 0..8 {
        positions.push(origin[0] + if i & 1 != 0 { size } else { 0.0 });
        positions.push(origin[1] + if i & 2 != 0 { size } else { 0.0 });
        positions.push(origin[2] + if i & 4 != 0 { size } else { 0.0 });
    }
    let normals = (0..8).flat_map(|_| [0.0, 1.0, 0.0]).collect();
    PrimitiveParams {
        primitive_id: Some(primitive_id),
        color: Some([0.5, 1.0, 0.0]),
        opacity: Some(opacity),
        positions: Some(positions),
        normals: Some(normals),
        indices: Some(vec![
            0, 2, 1, 1, 2, 3, 4, 5, 6, 5, 7, 6, 0, 1, 4, 1, 5, 4, 2, 6, 3, 3, 6, 7, 0, 4, 2, 2, 4,
            6, 1, 3, 5, 3, 7, 5,
        ]),
        ..Default::default()
    }
}

/// Exclusive boxes spread over several tiles plus one shared box placed
/// twice, with non-ASCII ids.
fn sample_model() -> XktModel {
    let mut model = XktModel::with_config(ModelConfig {
        min_tile_diagonal: 50.0,
        ..Default::default()
    });

    for i in 0..6u32 {
        let origin = [i as f64 * 40.0, 0.0, (i % 2) as f64 * 40.0];
        model
            .create_primitive(box_primitive(i, origin, 3.0, 1.0))
            .unwrap();
        model
            .create_entity(EntityParams {
                entity_id: Some(format!("wall-{i}")),
                primitive_ids: Some(vec![i]),
                ..Default::default()
            })
            .unwrap();
    }

    model
        .create_primitive(box_primitive(100, [0.0; 3], 1.0, 0.5))
        .unwrap();
    for (id, x) in [("fenêtre", 5.0), ("窓 𝄞", 125.0)] {
        model
            .create_entity(EntityParams {
                entity_id: Some(id.to_string()),
                transform: Some(Transform::Matrix(Matrix4::new_translation(&Vector3::new(
                    x, 10.0, 0.0,
                )))),
                primitive_ids: Some(vec![100]),
            })
            .unwrap();
    }

    model.finalize().unwrap();
    model
}

fn header_word(bytes: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]])
}

#[test]
fn test_round_trip_validates() {
    let model = sample_model();
    assert!(model.tiles().len() > 1);

    let bytes = write_xkt(&model, &WriterConfig::default()).unwrap();
    let report = validate(&bytes, &model);
    assert!(report.is_valid(), "{:?}", report.failures);
    assert!(validate_xkt(&bytes, &model));
}

#[test]
fn test_round_trip_uncompressed_level() {
    let model = sample_model();
    let bytes = write_xkt(
        &model,
        &WriterConfig {
            compression_level: 0,
        },
    )
    .unwrap();
    assert!(validate_xkt(&bytes, &model));
}

#[test]
fn test_header_integrity() {
    let model = sample_model();
    let bytes = write_xkt(&model, &WriterConfig::default()).unwrap();

    assert_eq!(header_word(&bytes, 0), 6);
    let count = header_word(&bytes, 1) as usize;
    assert_eq!(count, NUM_ELEMENTS);

    let sizes: u64 = (0..count).map(|i| header_word(&bytes, 2 + i) as u64).sum();
    assert_eq!((2 + count) as u64 * 4 + sizes, bytes.len() as u64);

    let header = read_header(&bytes).unwrap();
    assert_eq!(header.element_sizes.len(), count);
    assert_eq!(header.total_len(), bytes.len() as u64);
}

#[test]
fn test_decoded_layout() {
    let model = sample_model();
    let data = read_xkt(&write_xkt(&model, &WriterConfig::default()).unwrap()).unwrap();

    assert_eq!(data.primitive_count(), 7);
    assert_eq!(data.entity_count(), 8);
    assert_eq!(data.tile_count(), model.tiles().len());
    assert_eq!(data.reused_primitives_decode_matrix.len(), 16);
    assert_eq!(data.each_tile_aabb.len(), model.tiles().len() * 6);

    // Shared primitive: rgb from 0.5/1/0, opacity 0.5
    assert_eq!(&data.each_primitive_color_and_opacity[24..28], &[127, 255, 0, 127]);

    // Only the two instanced entities carry matrices
    assert_eq!(data.matrices.len(), 32);
    for (slot, entity) in model.entities().enumerate() {
        if !entity.has_reused_primitives {
            assert_eq!(data.each_entity_matrices_portion[slot], 0);
        }
    }
}

#[test]
fn test_decoded_matrices_match_model() {
    let model = sample_model();
    let data = read_xkt(&write_xkt(&model, &WriterConfig::default()).unwrap()).unwrap();

    let decode = model.reused_primitives_decode_matrix();
    for (&packed, &expected) in data.reused_primitives_decode_matrix.iter().zip(decode.iter()) {
        assert_relative_eq!(packed as f64, expected, max_relative = 1e-6, epsilon = 1e-9);
    }

    for (slot, entity) in model.entities().enumerate() {
        if !entity.has_reused_primitives {
            continue;
        }
        let start = data.each_entity_matrices_portion[slot] as usize;
        let packed = &data.matrices[start..start + 16];
        for (&p, &expected) in packed.iter().zip(entity.matrix.iter()) {
            assert_relative_eq!(p as f64, expected, max_relative = 1e-6, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_entity_ids_are_ascii_escaped() {
    let model = sample_model();
    let bytes = write_xkt(&model, &WriterConfig::default()).unwrap();
    let header = read_header(&bytes).unwrap();

    let index = Element::EachEntityId as usize;
    let start = header.header_len()
        + header.element_sizes[..index]
            .iter()
            .map(|&s| s as usize)
            .sum::<usize>();
    let end = start + header.element_sizes[index] as usize;
    let json = ZlibCodec::default().decompress(&bytes[start..end]).unwrap();

    assert!(json.is_ascii());
    let text = String::from_utf8(json).unwrap();
    assert!(text.contains("fen\\u00eatre"));
    assert!(text.contains("\\u7a93 \\ud834\\udd1e"));

    let data = read_xkt(&bytes).unwrap();
    assert!(data.each_entity_id.contains(&"窓 𝄞".to_string()));
    assert!(data.each_entity_id.contains(&"fenêtre".to_string()));
}

#[test]
fn test_corruption_is_detected() {
    let model = sample_model();
    let bytes = write_xkt(&model, &WriterConfig::default()).unwrap();

    let mut data = read_xkt(&bytes).unwrap();
    data.positions[0] ^= 1;
    let corrupt = XktWriter::new(&WriterConfig::default())
        .unwrap()
        .write_data(&data)
        .unwrap();

    let report = validate(&corrupt, &model);
    assert!(!report.is_valid());
    assert!(report.has_failure("primitive[0].positions"));

    let mut data = read_xkt(&bytes).unwrap();
    data.each_entity_id.swap(0, 1);
    let corrupt = XktWriter::new(&WriterConfig::default())
        .unwrap()
        .write_data(&data)
        .unwrap();
    let report = validate(&corrupt, &model);
    assert!(report.has_failure("entity[0].id"));
}

#[test]
fn test_rejects_other_versions() {
    let model = sample_model();
    let mut bytes = write_xkt(&model, &WriterConfig::default()).unwrap();
    bytes[0] = 7;

    assert!(matches!(
        read_xkt(&bytes),
        Err(Error::UnsupportedVersion { found: 7, .. })
    ));
    let report = validate(&bytes, &model);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].check, "read");
}

#[test]
fn test_rejects_truncated_buffer() {
    let model = sample_model();
    let bytes = write_xkt(&model, &WriterConfig::default()).unwrap();
    let truncated = &bytes[..bytes.len() - 1];
    assert!(matches!(read_xkt(truncated), Err(Error::Truncated { .. })));
    assert!(!validate_xkt(truncated, &model));
}

#[test]
fn test_write_requires_finalize() {
    let mut model = XktModel::new();
    model
        .create_primitive(box_primitive(1, [0.0; 3], 1.0, 1.0))
        .unwrap();
    assert!(matches!(
        write_xkt(&model, &WriterConfig::default()),
        Err(Error::NotFinalized)
    ));
}

#[test]
fn test_empty_model_round_trip() {
    let mut model = XktModel::new();
    model.finalize().unwrap();
    let bytes = write_xkt(&model, &WriterConfig::default()).unwrap();
    let data = read_xkt(&bytes).unwrap();
    assert_eq!(data.entity_count(), 0);
    assert!(validate_xkt(&bytes, &model));
}
