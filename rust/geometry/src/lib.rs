// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XKT-Lite Geometry
//!
//! Geometry compression primitives used by the XKT document model:
//! 16-bit position quantization against an axis-aligned box, octahedral
//! normal encoding, and crease/boundary edge extraction by vertex welding.
//! All math goes through nalgebra.

pub mod aabb;
pub mod codec;
pub mod edges;
pub mod error;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use aabb::Aabb;
pub use codec::{
    build_decode_matrix, decompress_position, decompress_positions, oct_decode_normal,
    oct_encode_normal, oct_encode_normals, quantize_positions, transform_and_oct_encode_normals,
    QUANTIZE_MAX,
};
pub use edges::{build_edge_indices, EdgeIndices, EdgeIndicesIter, DEFAULT_EDGE_THRESHOLD_DEGREES};
pub use error::{Error, Result};
pub use transform::{compose_trs, is_identity, normal_matrix, transform_positions};
