// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # XKT-Lite Core
//!
//! In-memory document model for XKT files: primitives (geometry),
//! entities (placed objects that instance primitives) and tiles (spatial
//! groups of entities).
//!
//! ## Overview
//!
//! - **Primitives** are compressed at creation: normals are oct-encoded and
//!   crease/boundary edges are extracted.
//! - **Entities** either own their primitives exclusively, in which case the
//!   geometry is baked into world space, or share them with other entities
//!   and position them with a modeling matrix.
//! - **Finalize** computes entity bounds, groups entities into tiles with a
//!   KD-tree, recentres each tile on its center and quantizes positions to
//!   16 bits.
//!
//! ## Quick Start
//!
//! ```rust
//! use xkt_lite_core::{EntityParams, PrimitiveParams, XktModel};
//!
//! let mut model = XktModel::new();
//! model.create_primitive(PrimitiveParams {
//!     primitive_id: Some(1),
//!     color: Some([1.0, 0.0, 0.0]),
//!     opacity: Some(1.0),
//!     positions: Some(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
//!     normals: Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
//!     indices: Some(vec![0, 1, 2]),
//!     ..Default::default()
//! })?;
//! model.create_entity(EntityParams {
//!     entity_id: Some("triangle".into()),
//!     primitive_ids: Some(vec![1]),
//!     ..Default::default()
//! })?;
//! model.finalize()?;
//! assert_eq!(model.tiles().len(), 1);
//! # Ok::<(), xkt_lite_core::Error>(())
//! ```

pub mod config;
pub mod diagnostics;
pub mod entity;
pub mod error;
mod finalize;
pub mod model;
pub mod params;
pub mod primitive;
mod tiler;

pub use config::{ModelConfig, MIN_TILE_DIAG};
pub use diagnostics::Diagnostic;
pub use entity::{Entity, EntityKey, Tile};
pub use error::{Error, Result};
pub use model::{ModelStats, XktModel};
pub use params::{EntityParams, PrimitiveParams, PrimitiveType, Transform};
pub use primitive::{pack_unit, Primitive, PrimitiveIndex, PrimitiveInstance, PrimitiveInstanceIndex};

// Re-export the geometry crate for downstream users
pub use xkt_lite_geometry as geometry;
