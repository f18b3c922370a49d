// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat, uncompressed XKT arrays.
//!
//! [`XktData`] is the decoded form of every element. The writer builds it
//! from a finalized model, the reader rebuilds it from a buffer.

use std::fmt::Write as _;
use std::ops::Range;

use nalgebra::Matrix4;
use xkt_lite_core::XktModel;

use crate::error::{Error, Result};
use crate::layout::{Element, NUM_ELEMENTS};

/// Every XKT element as a typed array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XktData {
    pub positions: Vec<u16>,
    pub normals: Vec<i8>,
    pub indices: Vec<u32>,
    pub edge_indices: Vec<u32>,
    pub matrices: Vec<f32>,
    pub reused_primitives_decode_matrix: Vec<f32>,
    pub each_primitive_positions_and_normals_portion: Vec<u32>,
    pub each_primitive_indices_portion: Vec<u32>,
    pub each_primitive_edge_indices_portion: Vec<u32>,
    pub each_primitive_color_and_opacity: Vec<u8>,
    pub primitive_instances: Vec<u32>,
    pub each_entity_id: Vec<String>,
    pub each_entity_primitive_instances_portion: Vec<u32>,
    pub each_entity_matrices_portion: Vec<u32>,
    pub each_tile_aabb: Vec<f64>,
    pub each_tile_entities_portion: Vec<u32>,
}

/// Range of item `i` in an array split by start offsets.
///
/// The last item runs to `total`. Offsets past `total` are clamped so a
/// corrupt buffer yields an empty range instead of a panic.
pub fn portion_range(portions: &[u32], i: usize, total: usize) -> Range<usize> {
    let start = portions.get(i).map_or(total, |&p| p as usize).min(total);
    let end = portions
        .get(i + 1)
        .map_or(total, |&p| p as usize)
        .clamp(start, total);
    start..end
}

/// Column-major f32 copy of a matrix.
pub fn matrix_to_f32(matrix: &Matrix4<f64>) -> [f32; 16] {
    let mut out = [0f32; 16];
    for (dst, &src) in out.iter_mut().zip(matrix.iter()) {
        *dst = src as f32;
    }
    out
}

/// Rewrite every UTF-16 unit from U+007F upward as a `\uXXXX` escape.
///
/// Applied to JSON text; structural characters are ASCII so only string
/// contents change.
pub fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if (c as u32) < 0x7F {
            out.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            // Writing to a String cannot fail
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
    out
}

macro_rules! le_array {
    ($encode:ident, $decode:ident, $ty:ty) => {
        fn $encode(values: &[$ty]) -> Vec<u8> {
            let mut out = Vec::with_capacity(values.len() * std::mem::size_of::<$ty>());
            for v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
            out
        }

        fn $decode(element: Element, bytes: &[u8]) -> Result<Vec<$ty>> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            check_aligned(element, bytes.len(), WIDTH)?;
            Ok(bytes
                .chunks_exact(WIDTH)
                .map(|chunk| {
                    let mut buf = [0u8; WIDTH];
                    buf.copy_from_slice(chunk);
                    <$ty>::from_le_bytes(buf)
                })
                .collect())
        }
    };
}

le_array!(encode_u16, decode_u16, u16);
le_array!(encode_u32, decode_u32, u32);
le_array!(encode_f32, decode_f32, f32);
le_array!(encode_f64, decode_f64, f64);

fn check_aligned(element: Element, len: usize, width: usize) -> Result<()> {
    if len % width != 0 {
        return Err(Error::Misaligned {
            element: element.name(),
            len,
            width,
        });
    }
    Ok(())
}

impl XktData {
    /// Flatten a finalized model.
    ///
    /// Primitives keep creation order; entities and their primitive
    /// instances follow tile order.
    pub fn from_model(model: &XktModel) -> Result<Self> {
        if !model.is_finalized() {
            return Err(Error::NotFinalized);
        }

        let mut data = XktData::default();

        for primitive in model.primitives() {
            data.each_primitive_positions_and_normals_portion
                .push(data.positions.len() as u32);
            data.each_primitive_indices_portion
                .push(data.indices.len() as u32);
            data.each_primitive_edge_indices_portion
                .push(data.edge_indices.len() as u32);

            data.positions.extend_from_slice(&primitive.positions_quantized);
            data.normals.extend_from_slice(&primitive.normals);
            data.indices.extend_from_slice(&primitive.indices);
            data.edge_indices.extend(primitive.edge_indices.iter_u32());
            data.each_primitive_color_and_opacity
                .extend_from_slice(&primitive.color_and_opacity());
        }

        data.reused_primitives_decode_matrix =
            matrix_to_f32(model.reused_primitives_decode_matrix()).to_vec();

        for entity in model.entities() {
            data.each_entity_id.push(entity.entity_id.clone());
            data.each_entity_primitive_instances_portion
                .push(data.primitive_instances.len() as u32);

            if entity.has_reused_primitives {
                data.each_entity_matrices_portion
                    .push(data.matrices.len() as u32);
                data.matrices.extend_from_slice(&matrix_to_f32(&entity.matrix));
            } else {
                data.each_entity_matrices_portion.push(0);
            }

            for &index in &entity.primitive_instances {
                if let Some(instance) = model.primitive_instance(index) {
                    data.primitive_instances.push(instance.primitive.0);
                }
            }
        }

        let mut entity_offset = 0u32;
        for tile in model.tiles() {
            data.each_tile_entities_portion.push(entity_offset);
            data.each_tile_aabb.extend_from_slice(&tile.aabb.to_array());
            entity_offset += tile.entities.len() as u32;
        }

        Ok(data)
    }

    pub fn primitive_count(&self) -> usize {
        self.each_primitive_positions_and_normals_portion.len()
    }

    pub fn entity_count(&self) -> usize {
        self.each_entity_id.len()
    }

    pub fn tile_count(&self) -> usize {
        self.each_tile_entities_portion.len()
    }

    /// Position (and normal) item range of primitive `i`.
    pub fn primitive_positions_range(&self, i: usize) -> Range<usize> {
        portion_range(
            &self.each_primitive_positions_and_normals_portion,
            i,
            self.positions.len(),
        )
    }

    pub fn primitive_indices_range(&self, i: usize) -> Range<usize> {
        portion_range(&self.each_primitive_indices_portion, i, self.indices.len())
    }

    pub fn primitive_edge_indices_range(&self, i: usize) -> Range<usize> {
        portion_range(
            &self.each_primitive_edge_indices_portion,
            i,
            self.edge_indices.len(),
        )
    }

    pub fn entity_primitive_instances_range(&self, i: usize) -> Range<usize> {
        portion_range(
            &self.each_entity_primitive_instances_portion,
            i,
            self.primitive_instances.len(),
        )
    }

    pub fn tile_entities_range(&self, i: usize) -> Range<usize> {
        portion_range(&self.each_tile_entities_portion, i, self.entity_count())
    }

    /// Serialize every element, in file order.
    pub fn encode_elements(&self) -> Result<Vec<Vec<u8>>> {
        Element::ALL
            .iter()
            .map(|&element| self.encode_element(element))
            .collect()
    }

    fn encode_element(&self, element: Element) -> Result<Vec<u8>> {
        Ok(match element {
            Element::Positions => encode_u16(&self.positions),
            Element::Normals => self.normals.iter().map(|&v| v as u8).collect(),
            Element::Indices => encode_u32(&self.indices),
            Element::EdgeIndices => encode_u32(&self.edge_indices),
            Element::Matrices => encode_f32(&self.matrices),
            Element::ReusedPrimitivesDecodeMatrix => {
                encode_f32(&self.reused_primitives_decode_matrix)
            }
            Element::EachPrimitivePositionsAndNormalsPortion => {
                encode_u32(&self.each_primitive_positions_and_normals_portion)
            }
            Element::EachPrimitiveIndicesPortion => {
                encode_u32(&self.each_primitive_indices_portion)
            }
            Element::EachPrimitiveEdgeIndicesPortion => {
                encode_u32(&self.each_primitive_edge_indices_portion)
            }
            Element::EachPrimitiveColorAndOpacity => self.each_primitive_color_and_opacity.clone(),
            Element::PrimitiveInstances => encode_u32(&self.primitive_instances),
            Element::EachEntityId => {
                escape_non_ascii(&serde_json::to_string(&self.each_entity_id)?).into_bytes()
            }
            Element::EachEntityPrimitiveInstancesPortion => {
                encode_u32(&self.each_entity_primitive_instances_portion)
            }
            Element::EachEntityMatricesPortion => encode_u32(&self.each_entity_matrices_portion),
            Element::EachTileAabb => encode_f64(&self.each_tile_aabb),
            Element::EachTileEntitiesPortion => encode_u32(&self.each_tile_entities_portion),
        })
    }

    /// Rebuild from decompressed element payloads in file order.
    pub fn decode_elements(elements: &[Vec<u8>]) -> Result<Self> {
        if elements.len() != NUM_ELEMENTS {
            return Err(Error::ElementCount {
                found: elements.len() as u32,
                expected: NUM_ELEMENTS as u32,
            });
        }

        let mut data = XktData::default();
        for (&element, bytes) in Element::ALL.iter().zip(elements) {
            match element {
                Element::Positions => data.positions = decode_u16(element, bytes)?,
                Element::Normals => data.normals = bytes.iter().map(|&b| b as i8).collect(),
                Element::Indices => data.indices = decode_u32(element, bytes)?,
                Element::EdgeIndices => data.edge_indices = decode_u32(element, bytes)?,
                Element::Matrices => data.matrices = decode_f32(element, bytes)?,
                Element::ReusedPrimitivesDecodeMatrix => {
                    data.reused_primitives_decode_matrix = decode_f32(element, bytes)?
                }
                Element::EachPrimitivePositionsAndNormalsPortion => {
                    data.each_primitive_positions_and_normals_portion =
                        decode_u32(element, bytes)?
                }
                Element::EachPrimitiveIndicesPortion => {
                    data.each_primitive_indices_portion = decode_u32(element, bytes)?
                }
                Element::EachPrimitiveEdgeIndicesPortion => {
                    data.each_primitive_edge_indices_portion = decode_u32(element, bytes)?
                }
                Element::EachPrimitiveColorAndOpacity => {
                    check_aligned(element, bytes.len(), 4)?;
                    data.each_primitive_color_and_opacity = bytes.clone();
                }
                Element::PrimitiveInstances => {
                    data.primitive_instances = decode_u32(element, bytes)?
                }
                Element::EachEntityId => data.each_entity_id = serde_json::from_slice(bytes)?,
                Element::EachEntityPrimitiveInstancesPortion => {
                    data.each_entity_primitive_instances_portion = decode_u32(element, bytes)?
                }
                Element::EachEntityMatricesPortion => {
                    data.each_entity_matrices_portion = decode_u32(element, bytes)?
                }
                Element::EachTileAabb => {
                    check_aligned(element, bytes.len(), 6 * 8)?;
                    data.each_tile_aabb = decode_f64(element, bytes)?;
                }
                Element::EachTileEntitiesPortion => {
                    data.each_tile_entities_portion = decode_u32(element, bytes)?
                }
            }
        }
        Ok(data)
    }
}
