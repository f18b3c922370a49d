// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Checks a packed buffer against the model it was written from.
//!
//! Walks tiles, then their entities, then each entity's primitive
//! instances, and compares every array exactly. Mismatches are collected
//! rather than returned as errors, so one run reports all of them.

use std::fmt::Debug;

use xkt_lite_core::{Entity, Primitive, XktModel};

use crate::data::{matrix_to_f32, XktData};
use crate::reader::read_xkt;

/// One failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// What was compared, e.g. `primitive[3].normals`.
    pub check: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether any failure's check starts with `prefix`.
    pub fn has_failure(&self, prefix: &str) -> bool {
        self.failures.iter().any(|f| f.check.starts_with(prefix))
    }

    fn fail(&mut self, check: String, detail: String) {
        tracing::error!(check = %check, "XKT validation failed: {}", detail);
        self.failures.push(ValidationFailure { check, detail });
    }

    fn expect_eq<T: PartialEq + Debug>(
        &mut self,
        check: impl FnOnce() -> String,
        expected: T,
        found: T,
    ) {
        if expected != found {
            self.fail(check(), format!("expected {:?}, found {:?}", expected, found));
        }
    }

    fn expect_slice<T: PartialEq + Debug>(
        &mut self,
        check: impl FnOnce() -> String,
        expected: &[T],
        found: Option<&[T]>,
    ) {
        if let Some(detail) = slice_mismatch(expected, found) {
            self.fail(check(), detail);
        }
    }
}

fn slice_mismatch<T: PartialEq + Debug>(expected: &[T], found: Option<&[T]>) -> Option<String> {
    let Some(found) = found else {
        return Some("range out of bounds".to_string());
    };
    if found.len() != expected.len() {
        return Some(format!(
            "length mismatch: expected {}, found {}",
            expected.len(),
            found.len()
        ));
    }
    expected
        .iter()
        .zip(found)
        .position(|(e, f)| e != f)
        .map(|i| format!("item {}: expected {:?}, found {:?}", i, expected[i], found[i]))
}

fn f32_bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}

/// Parse `buffer` and compare it with `model`.
///
/// A buffer that cannot be parsed yields a single `read` failure.
pub fn validate(buffer: &[u8], model: &XktModel) -> ValidationReport {
    match read_xkt(buffer) {
        Ok(data) => validate_data(&data, model),
        Err(e) => {
            let mut report = ValidationReport::default();
            report.fail("read".to_string(), e.to_string());
            report
        }
    }
}

/// Shorthand for [`validate`] returning only the verdict.
pub fn validate_xkt(buffer: &[u8], model: &XktModel) -> bool {
    validate(buffer, model).is_valid()
}

/// Compare decoded arrays with `model`.
pub fn validate_data(data: &XktData, model: &XktModel) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !model.is_finalized() {
        report.fail(
            "model.finalized".to_string(),
            "model is not finalized".to_string(),
        );
        return report;
    }

    let primitives = model.primitives();
    report.expect_eq(|| "primitives.count".into(), primitives.len(), data.primitive_count());
    report.expect_eq(|| "entities.count".into(), model.entity_count(), data.entity_count());
    report.expect_eq(|| "tiles.count".into(), model.tiles().len(), data.tile_count());
    report.expect_eq(
        || "primitiveInstances.count".into(),
        model.primitive_instances().len(),
        data.primitive_instances.len(),
    );
    report.expect_slice(
        || "reusedPrimitivesDecodeMatrix".into(),
        &f32_bits(&matrix_to_f32(model.reused_primitives_decode_matrix())),
        Some(f32_bits(&data.reused_primitives_decode_matrix).as_slice()),
    );

    let mut checked = vec![false; primitives.len()];

    for (t, tile) in model.tiles().iter().enumerate() {
        if t >= data.tile_count() {
            break;
        }
        report.expect_slice(
            || format!("tile[{}].aabb", t),
            &tile.aabb.to_array(),
            data.each_tile_aabb.get(t * 6..t * 6 + 6),
        );

        let range = data.tile_entities_range(t);
        if range.len() != tile.entities.len() {
            report.fail(
                format!("tile[{}].entities", t),
                format!(
                    "expected {} entities, found {}",
                    tile.entities.len(),
                    range.len()
                ),
            );
            continue;
        }

        for (slot, &key) in range.zip(&tile.entities) {
            if let Some(entity) = model.entity_at(key) {
                check_entity(&mut report, data, model, slot, entity, &mut checked);
            }
        }
    }

    // Primitives no entity reaches
    for (i, primitive) in primitives.iter().enumerate() {
        if !checked[i] {
            check_primitive(&mut report, data, primitive);
        }
    }

    let mut uses = vec![0u32; primitives.len()];
    for &p in &data.primitive_instances {
        if let Some(n) = uses.get_mut(p as usize) {
            *n += 1;
        }
    }
    for (primitive, &count) in primitives.iter().zip(&uses) {
        report.expect_eq(
            || format!("primitive[{}].numInstances", primitive.index.0),
            primitive.num_instances,
            count,
        );
    }

    report
}

fn check_entity(
    report: &mut ValidationReport,
    data: &XktData,
    model: &XktModel,
    slot: usize,
    entity: &Entity,
    checked: &mut [bool],
) {
    let name = |field: &str| format!("entity[{}].{}", slot, field);

    report.expect_eq(
        || name("id"),
        Some(entity.entity_id.as_str()),
        data.each_entity_id.get(slot).map(String::as_str),
    );
    report.expect_eq(|| name("index"), Some(slot as u32), entity.entity_index);

    if entity.has_reused_primitives {
        let found = data
            .each_entity_matrices_portion
            .get(slot)
            .and_then(|&offset| data.matrices.get(offset as usize..offset as usize + 16));
        report.expect_slice(
            || name("matrix"),
            &f32_bits(&matrix_to_f32(&entity.matrix)),
            found.map(f32_bits).as_deref(),
        );
    }

    let range = data.entity_primitive_instances_range(slot);
    if range.len() != entity.primitive_instances.len() {
        report.fail(
            name("primitiveInstances"),
            format!(
                "expected {} primitive instances, found {}",
                entity.primitive_instances.len(),
                range.len()
            ),
        );
        return;
    }

    for (k, (file_index, &index)) in range.zip(&entity.primitive_instances).enumerate() {
        let Some(instance) = model.primitive_instance(index) else {
            continue;
        };
        let expected = instance.primitive.0;
        let found = data.primitive_instances[file_index];
        if expected != found {
            report.fail(
                format!("entity[{}].primitiveInstance[{}]", slot, k),
                format!("expected primitive {}, found {}", expected, found),
            );
            continue;
        }

        let p = instance.primitive.index();
        let primitive = model.primitive_at(instance.primitive);
        if let (Some(done), Some(primitive)) = (checked.get_mut(p), primitive) {
            if !*done {
                *done = true;
                check_primitive(report, data, primitive);
            }
        }
    }
}

fn check_primitive(report: &mut ValidationReport, data: &XktData, primitive: &Primitive) {
    let i = primitive.index.index();
    let name = |field: &str| format!("primitive[{}].{}", i, field);
    if i >= data.primitive_count() {
        report.fail(name("index"), "primitive missing from buffer".to_string());
        return;
    }

    let range = data.primitive_positions_range(i);
    report.expect_slice(
        || name("positions"),
        &primitive.positions_quantized,
        data.positions.get(range.clone()),
    );
    report.expect_slice(|| name("normals"), &primitive.normals, data.normals.get(range));
    report.expect_slice(
        || name("indices"),
        &primitive.indices,
        data.indices.get(data.primitive_indices_range(i)),
    );
    report.expect_slice(
        || name("edgeIndices"),
        &primitive.edge_indices.to_u32_vec(),
        data.edge_indices.get(data.primitive_edge_indices_range(i)),
    );

    let rgba = primitive.color_and_opacity();
    match data.each_primitive_color_and_opacity.get(i * 4..i * 4 + 4) {
        Some(found) => {
            report.expect_slice(|| name("color"), &rgba[..3], Some(&found[..3]));
            report.expect_eq(|| name("opacity"), rgba[3], found[3]);
        }
        None => report.fail(name("color"), "range out of bounds".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_mismatch() {
        assert_eq!(slice_mismatch(&[1, 2, 3], Some(&[1, 2, 3][..])), None);
        assert_eq!(
            slice_mismatch(&[1, 2, 3], Some(&[1, 5, 3][..])),
            Some("item 1: expected 2, found 5".to_string())
        );
        assert!(slice_mismatch(&[1, 2], Some(&[1][..])).is_some());
        assert!(slice_mismatch::<u8>(&[1], None).is_some());
    }

    #[test]
    fn test_unparseable_buffer() {
        let mut model = XktModel::new();
        model.finalize().unwrap();
        let report = validate(&[0, 1, 2], &model);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].check, "read");
        assert!(!validate_xkt(&[0, 1, 2], &model));
    }
}
