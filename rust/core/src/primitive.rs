// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitives and primitive instances.

use xkt_lite_geometry::EdgeIndices;

use crate::entity::EntityKey;
use crate::params::PrimitiveType;

/// Index of a primitive in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveIndex(pub u32);

impl PrimitiveIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pack a `[0, 1]` component into a byte.
#[inline]
pub fn pack_unit(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).floor() as u8
}

/// Reusable geometry.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub primitive_id: u32,
    pub primitive_type: PrimitiveType,
    pub index: PrimitiveIndex,
    /// Packed RGB.
    pub color: [u8; 3],
    pub opacity: f32,
    /// Local positions when reused, world positions when exclusive.
    pub positions: Vec<f64>,
    /// Oct-encoded, three bytes per vertex (third is zero).
    pub normals: Vec<i8>,
    pub indices: Vec<u32>,
    pub edge_indices: EdgeIndices,
    /// Filled during finalize.
    pub positions_quantized: Vec<u16>,
    pub num_instances: u32,
}

impl Primitive {
    /// Shared by more than one entity.
    #[inline]
    pub fn reused(&self) -> bool {
        self.num_instances > 1
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Packed RGBA.
    pub fn color_and_opacity(&self) -> [u8; 4] {
        [
            self.color[0],
            self.color[1],
            self.color[2],
            pack_unit(self.opacity as f64),
        ]
    }
}

/// Index of a primitive instance in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveInstanceIndex(pub u32);

impl PrimitiveInstanceIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Use of a primitive by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveInstance {
    pub index: PrimitiveInstanceIndex,
    pub primitive: PrimitiveIndex,
    pub entity: EntityKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unit() {
        assert_eq!(pack_unit(0.0), 0);
        assert_eq!(pack_unit(1.0), 255);
        assert_eq!(pack_unit(0.5), 127);
        assert_eq!(pack_unit(-3.0), 0);
        assert_eq!(pack_unit(7.0), 255);
    }
}
