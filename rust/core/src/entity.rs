// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entities and tiles.

use nalgebra::Matrix4;
use smallvec::SmallVec;
use xkt_lite_geometry::Aabb;

use crate::primitive::PrimitiveInstanceIndex;

/// Entity slot in creation order. Stable across finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(pub u32);

impl EntityKey {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A placed object.
#[derive(Debug, Clone)]
pub struct Entity {
    pub entity_id: String,
    /// Applied to shared primitives at render time. Finalize prepends the
    /// tile recentring translation.
    pub matrix: Matrix4<f64>,
    pub primitive_instances: SmallVec<[PrimitiveInstanceIndex; 4]>,
    /// World-space bounds, set at finalize.
    pub aabb: Aabb,
    pub has_reused_primitives: bool,
    /// Position in tile order, set at finalize.
    pub entity_index: Option<u32>,
}

/// A spatial partition of entities.
#[derive(Debug, Clone)]
pub struct Tile {
    pub aabb: Aabb,
    pub entities: Vec<EntityKey>,
}
