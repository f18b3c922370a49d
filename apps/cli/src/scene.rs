// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scene input.
//!
//! ```json
//! {
//!   "primitives": [{ "id": 1, "color": [1, 0, 0], "opacity": 1,
//!                    "positions": [...], "normals": [...], "indices": [...] }],
//!   "entities": [{ "id": "wall", "position": [0, 0, 5], "primitiveIds": [1] }]
//! }
//! ```
//!
//! Matrices are 16 numbers in column-major order. Fields the model needs
//! but the scene omits are reported by the model itself.

use std::path::Path;

use anyhow::Context;
use nalgebra::{Matrix4, Vector3};
use serde::Deserialize;
use xkt_lite_core::{EntityParams, ModelConfig, PrimitiveParams, PrimitiveType, Transform, XktModel};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub primitives: Vec<ScenePrimitive>,
    #[serde(default)]
    pub entities: Vec<SceneEntity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePrimitive {
    pub id: Option<u32>,
    #[serde(rename = "type", default)]
    pub primitive_type: PrimitiveType,
    pub color: Option<[f64; 3]>,
    pub opacity: Option<f64>,
    pub positions: Option<Vec<f64>>,
    pub normals: Option<Vec<f64>>,
    pub indices: Option<Vec<u32>>,
    pub matrix: Option<[f64; 16]>,
    pub position: Option<[f64; 3]>,
    pub scale: Option<[f64; 3]>,
    pub rotation: Option<[f64; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntity {
    pub id: Option<String>,
    pub matrix: Option<[f64; 16]>,
    pub position: Option<[f64; 3]>,
    pub scale: Option<[f64; 3]>,
    pub rotation: Option<[f64; 3]>,
    pub primitive_ids: Option<Vec<u32>>,
}

/// A matrix wins over position/scale/rotation when both are given.
fn transform(
    matrix: Option<[f64; 16]>,
    position: Option<[f64; 3]>,
    scale: Option<[f64; 3]>,
    rotation: Option<[f64; 3]>,
) -> Option<Transform> {
    if let Some(m) = matrix {
        return Some(Transform::Matrix(Matrix4::from_column_slice(&m)));
    }
    Transform::from_parts(
        position.map(Vector3::from),
        scale.map(Vector3::from),
        rotation.map(Vector3::from),
    )
}

impl From<ScenePrimitive> for PrimitiveParams {
    fn from(p: ScenePrimitive) -> Self {
        PrimitiveParams {
            primitive_id: p.id,
            primitive_type: p.primitive_type,
            color: p.color,
            opacity: p.opacity,
            positions: p.positions,
            normals: p.normals,
            indices: p.indices,
            transform: transform(p.matrix, p.position, p.scale, p.rotation),
        }
    }
}

impl From<SceneEntity> for EntityParams {
    fn from(e: SceneEntity) -> Self {
        EntityParams {
            entity_id: e.id,
            transform: transform(e.matrix, e.position, e.scale, e.rotation),
            primitive_ids: e.primitive_ids,
        }
    }
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing scene {}", path.display()))
    }

    /// Create and finalize a model from this scene.
    pub fn build_model(self, config: ModelConfig) -> anyhow::Result<XktModel> {
        let mut model = XktModel::with_config(config);
        for (i, primitive) in self.primitives.into_iter().enumerate() {
            model
                .create_primitive(primitive.into())
                .with_context(|| format!("primitive #{}", i))?;
        }
        for (i, entity) in self.entities.into_iter().enumerate() {
            model
                .create_entity(entity.into())
                .with_context(|| format!("entity #{}", i))?;
        }
        model.finalize()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "primitives": [{
            "id": 1,
            "type": "triangles",
            "color": [1.0, 0.5, 0.0],
            "opacity": 1.0,
            "positions": [0, 0, 0, 1, 0, 0, 0, 1, 0],
            "normals": [0, 0, 1, 0, 0, 1, 0, 0, 1],
            "indices": [0, 1, 2]
        }],
        "entities": [
            { "id": "a", "position": [10, 0, 0], "primitiveIds": [1] },
            { "id": "b", "matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 20,0,0,1], "primitiveIds": [1] }
        ]
    }"#;

    #[test]
    fn test_build_model_from_json() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        let model = scene.build_model(ModelConfig::default()).unwrap();

        assert!(model.is_finalized());
        assert!(model.primitive(1).unwrap().reused());
        let b = model.entity("b").unwrap();
        assert_eq!(b.aabb.min.x, 20.0);
        let a = model.entity("a").unwrap();
        assert_eq!(a.aabb.max.x, 11.0);
    }

    #[test]
    fn test_missing_field_reported() {
        let scene: Scene = serde_json::from_str(
            r#"{ "primitives": [{ "id": 3, "positions": [], "normals": [], "indices": [] }] }"#,
        )
        .unwrap();
        let err = scene.build_model(ModelConfig::default()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("primitive #0"));
        assert!(message.contains("color"));
    }

    #[test]
    fn test_unknown_primitive_type_rejected() {
        let result: Result<Scene, _> =
            serde_json::from_str(r#"{ "primitives": [{ "id": 1, "type": "lines" }] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_matrix_beats_trs() {
        let t = transform(
            Some([1., 0., 0., 0., 0., 1., 0., 0., 0., 0., 1., 0., 5., 0., 0., 1.]),
            Some([100.0, 0.0, 0.0]),
            None,
            None,
        )
        .unwrap();
        assert_eq!(t.to_matrix()[(0, 3)], 5.0);
    }
}
