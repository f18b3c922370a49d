// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Creation parameters for primitives and entities.
//!
//! Required fields are `Option`s so that an importer can build the struct
//! incrementally; [`crate::XktModel`] reports the first missing one as
//! [`crate::Error::MissingParameter`].

use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};
use xkt_lite_geometry::compose_trs;

/// Geometry topology of a primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    #[default]
    Triangles,
}

/// Local-to-world placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Column-major modeling matrix.
    Matrix(Matrix4<f64>),
    /// Translation, per-axis scale and XYZ Euler angles in degrees.
    Trs {
        position: Vector3<f64>,
        scale: Vector3<f64>,
        rotation: Vector3<f64>,
    },
}

impl Transform {
    /// Build a transform from optional position/scale/rotation parts.
    ///
    /// Returns `None` when all three are absent. Missing parts default to
    /// zero translation, unit scale and no rotation.
    pub fn from_parts(
        position: Option<Vector3<f64>>,
        scale: Option<Vector3<f64>>,
        rotation: Option<Vector3<f64>>,
    ) -> Option<Self> {
        if position.is_none() && scale.is_none() && rotation.is_none() {
            return None;
        }
        Some(Transform::Trs {
            position: position.unwrap_or_else(Vector3::zeros),
            scale: scale.unwrap_or_else(|| Vector3::repeat(1.0)),
            rotation: rotation.unwrap_or_else(Vector3::zeros),
        })
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        match self {
            Transform::Matrix(m) => *m,
            Transform::Trs {
                position,
                scale,
                rotation,
            } => compose_trs(position, scale, rotation),
        }
    }
}

/// Parameters for [`crate::XktModel::create_primitive`].
#[derive(Debug, Clone, Default)]
pub struct PrimitiveParams {
    pub primitive_id: Option<u32>,
    pub primitive_type: PrimitiveType,
    /// RGB in `[0, 1]`.
    pub color: Option<[f64; 3]>,
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f64>,
    pub positions: Option<Vec<f64>>,
    pub normals: Option<Vec<f64>>,
    pub indices: Option<Vec<u32>>,
    /// When set and not the identity, positions and normals are baked
    /// through it at creation.
    pub transform: Option<Transform>,
}

/// Parameters for [`crate::XktModel::create_entity`].
#[derive(Debug, Clone, Default)]
pub struct EntityParams {
    pub entity_id: Option<String>,
    /// Defaults to the identity.
    pub transform: Option<Transform>,
    pub primitive_ids: Option<Vec<u32>>,
}
