// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The XKT document model.
//!
//! Primitives, primitive instances and entities are stored in insertion
//! ordered arenas and addressed by index; string and integer ids resolve
//! through hash lookups. Tiling happens in [`XktModel::finalize`], which
//! lives in `finalize.rs`.

use nalgebra::Matrix4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use xkt_lite_geometry::{
    build_edge_indices, is_identity, normal_matrix, oct_encode_normals,
    transform_and_oct_encode_normals, transform_positions, Error as GeometryError,
};

use crate::config::ModelConfig;
use crate::diagnostics::Diagnostic;
use crate::entity::{Entity, EntityKey, Tile};
use crate::error::{Error, Result};
use crate::params::{EntityParams, PrimitiveParams};
use crate::primitive::{
    pack_unit, Primitive, PrimitiveIndex, PrimitiveInstance, PrimitiveInstanceIndex,
};

/// Summary counts for logging and inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub primitives: usize,
    pub reused_primitives: usize,
    pub primitive_instances: usize,
    pub entities: usize,
    pub tiles: usize,
    pub triangles: usize,
    pub vertices: usize,
    pub edges: usize,
}

/// In-memory XKT model under construction.
#[derive(Debug, Clone)]
pub struct XktModel {
    pub(crate) config: ModelConfig,
    pub(crate) primitives: Vec<Primitive>,
    pub(crate) primitive_lookup: FxHashMap<u32, PrimitiveIndex>,
    pub(crate) primitive_instances: Vec<PrimitiveInstance>,
    pub(crate) entities: Vec<Entity>,
    pub(crate) entity_lookup: FxHashMap<String, EntityKey>,
    /// Entity keys in tile order, filled by finalize.
    pub(crate) entity_order: Vec<EntityKey>,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) reused_primitives_decode_matrix: Matrix4<f64>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) finalized: bool,
}

fn required<T>(value: Option<T>, operation: &'static str, name: &'static str) -> Result<T> {
    value.ok_or(Error::MissingParameter { operation, name })
}

impl Default for XktModel {
    fn default() -> Self {
        Self::with_config(ModelConfig::default())
    }
}

impl XktModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model with the given tunables.
    ///
    /// The config is not validated here; see [`ModelConfig::validate`].
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            config,
            primitives: Vec::new(),
            primitive_lookup: FxHashMap::default(),
            primitive_instances: Vec::new(),
            entities: Vec::new(),
            entity_lookup: FxHashMap::default(),
            entity_order: Vec::new(),
            tiles: Vec::new(),
            reused_primitives_decode_matrix: Matrix4::identity(),
            diagnostics: Vec::new(),
            finalized: false,
        }
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::PrimitiveNotFound { .. } => tracing::error!("{}", diagnostic),
            _ => tracing::warn!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Add a primitive.
    ///
    /// Edge indices are extracted from the untransformed positions. A
    /// non-identity transform bakes positions into world space and rotates
    /// the normals by its inverse-transpose.
    ///
    /// Returns `Ok(None)` without changing anything once the model is
    /// finalized.
    pub fn create_primitive(&mut self, params: PrimitiveParams) -> Result<Option<PrimitiveIndex>> {
        const OP: &str = "create_primitive";
        if self.finalized {
            self.record(Diagnostic::AlreadyFinalized { operation: OP });
            return Ok(None);
        }

        let primitive_id = required(params.primitive_id, OP, "primitive_id")?;
        let color = required(params.color, OP, "color")?;
        let opacity = required(params.opacity, OP, "opacity")?;
        let mut positions = required(params.positions, OP, "positions")?;
        let normals = required(params.normals, OP, "normals")?;
        let indices = required(params.indices, OP, "indices")?;

        if self.primitive_lookup.contains_key(&primitive_id) {
            return Err(Error::DuplicatePrimitive(primitive_id));
        }
        if normals.len() != positions.len() {
            return Err(GeometryError::NormalsMismatch {
                normals: normals.len(),
                positions: positions.len(),
            }
            .into());
        }

        let edge_indices = build_edge_indices(
            &positions,
            &indices,
            None,
            self.config.edge_threshold_degrees,
        )?;

        let matrix = params
            .transform
            .map(|t| t.to_matrix())
            .filter(|m| !is_identity(m));
        let normals = match matrix {
            Some(m) => {
                transform_positions(&m, &mut positions);
                transform_and_oct_encode_normals(&normal_matrix(&m), &normals)
            }
            None => oct_encode_normals(&normals),
        };

        let index = PrimitiveIndex(self.primitives.len() as u32);
        self.primitives.push(Primitive {
            primitive_id,
            primitive_type: params.primitive_type,
            index,
            color: color.map(pack_unit),
            opacity: opacity as f32,
            positions,
            normals,
            indices,
            edge_indices,
            positions_quantized: Vec::new(),
            num_instances: 0,
        });
        self.primitive_lookup.insert(primitive_id, index);

        tracing::debug!(primitive_id, index = index.0, baked = matrix.is_some(), "created primitive");
        Ok(Some(index))
    }

    /// Add an entity instancing the given primitives.
    ///
    /// Unknown primitive ids are skipped and recorded as
    /// [`Diagnostic::PrimitiveNotFound`].
    pub fn create_entity(&mut self, params: EntityParams) -> Result<Option<EntityKey>> {
        const OP: &str = "create_entity";
        if self.finalized {
            self.record(Diagnostic::AlreadyFinalized { operation: OP });
            return Ok(None);
        }

        let entity_id = required(params.entity_id, OP, "entity_id")?;
        let primitive_ids = required(params.primitive_ids, OP, "primitive_ids")?;
        if self.entity_lookup.contains_key(&entity_id) {
            return Err(Error::DuplicateEntity(entity_id));
        }

        let key = EntityKey(self.entities.len() as u32);
        let matrix = params
            .transform
            .map(|t| t.to_matrix())
            .unwrap_or_else(Matrix4::identity);

        let mut primitive_instances = SmallVec::new();
        for primitive_id in primitive_ids {
            let Some(&primitive) = self.primitive_lookup.get(&primitive_id) else {
                self.record(Diagnostic::PrimitiveNotFound {
                    entity_id: entity_id.clone(),
                    primitive_id,
                });
                continue;
            };
            self.primitives[primitive.index()].num_instances += 1;

            let index = PrimitiveInstanceIndex(self.primitive_instances.len() as u32);
            self.primitive_instances.push(PrimitiveInstance {
                index,
                primitive,
                entity: key,
            });
            primitive_instances.push(index);
        }

        self.entity_lookup.insert(entity_id.clone(), key);
        self.entities.push(Entity {
            entity_id,
            matrix,
            primitive_instances,
            aabb: Default::default(),
            has_reused_primitives: false,
            entity_index: None,
        });
        Ok(Some(key))
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Look up a primitive by id.
    pub fn primitive(&self, primitive_id: u32) -> Option<&Primitive> {
        self.primitive_lookup
            .get(&primitive_id)
            .map(|&i| &self.primitives[i.index()])
    }

    pub fn primitive_at(&self, index: PrimitiveIndex) -> Option<&Primitive> {
        self.primitives.get(index.index())
    }

    /// All primitives in creation order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// All primitive instances in creation order.
    pub fn primitive_instances(&self) -> &[PrimitiveInstance] {
        &self.primitive_instances
    }

    pub fn primitive_instance(&self, index: PrimitiveInstanceIndex) -> Option<&PrimitiveInstance> {
        self.primitive_instances.get(index.index())
    }

    /// Look up an entity by id.
    pub fn entity(&self, entity_id: &str) -> Option<&Entity> {
        self.entity_lookup
            .get(entity_id)
            .map(|&k| &self.entities[k.index()])
    }

    pub fn entity_at(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key.index())
    }

    /// Entities in tile order once finalized, creation order before.
    pub fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_> {
        if self.finalized {
            Box::new(self.entity_order.iter().map(|k| &self.entities[k.index()]))
        } else {
            Box::new(self.entities.iter())
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Dequantization matrix shared by every reused primitive.
    pub fn reused_primitives_decode_matrix(&self) -> &Matrix4<f64> {
        &self.reused_primitives_decode_matrix
    }

    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats {
            primitives: self.primitives.len(),
            primitive_instances: self.primitive_instances.len(),
            entities: self.entities.len(),
            tiles: self.tiles.len(),
            ..Default::default()
        };
        for primitive in &self.primitives {
            if primitive.reused() {
                stats.reused_primitives += 1;
            }
            stats.triangles += primitive.triangle_count();
            stats.vertices += primitive.vertex_count();
            stats.edges += primitive.edge_indices.len() / 2;
        }
        stats
    }
}

