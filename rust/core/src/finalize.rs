// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Finalization: entity bounds, tiling and quantization.

use nalgebra::{Matrix4, Point3};
use xkt_lite_geometry::{build_decode_matrix, quantize_positions, Aabb};

use crate::diagnostics::Diagnostic;
use crate::entity::{EntityKey, Tile};
use crate::error::{Error, Result};
use crate::model::XktModel;
use crate::tiler::KdTree;

impl XktModel {
    /// Freeze the model and build its tiles.
    ///
    /// Runs once. Later calls record [`Diagnostic::AlreadyFinalized`] and
    /// return without changes. Fails with [`Error::MixedPrimitiveReuse`],
    /// leaving the model untouched, when an entity mixes shared and
    /// exclusive primitives.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            self.record(Diagnostic::AlreadyFinalized {
                operation: "finalize",
            });
            return Ok(());
        }

        self.check_uniform_reuse()?;
        self.flag_reused_entities();
        self.compute_entity_aabbs();
        self.build_tiles();
        self.quantize_reused_primitives();
        self.quantize_unused_primitives();
        self.finalized = true;

        let stats = self.stats();
        tracing::info!(
            primitives = stats.primitives,
            reused_primitives = stats.reused_primitives,
            primitive_instances = stats.primitive_instances,
            entities = stats.entities,
            tiles = stats.tiles,
            triangles = stats.triangles,
            vertices = stats.vertices,
            edges = stats.edges,
            "model finalized"
        );
        Ok(())
    }

    fn check_uniform_reuse(&self) -> Result<()> {
        for entity in &self.entities {
            let mut reused = 0usize;
            for &instance in &entity.primitive_instances {
                let primitive = self.primitive_instances[instance.index()].primitive;
                if self.primitives[primitive.index()].reused() {
                    reused += 1;
                }
            }
            if reused != 0 && reused != entity.primitive_instances.len() {
                return Err(Error::MixedPrimitiveReuse {
                    entity_id: entity.entity_id.clone(),
                });
            }
        }
        Ok(())
    }

    fn flag_reused_entities(&mut self) {
        for entity in &mut self.entities {
            entity.has_reused_primitives = entity.primitive_instances.iter().any(|instance| {
                let primitive = self.primitive_instances[instance.index()].primitive;
                self.primitives[primitive.index()].reused()
            });
        }
    }

    fn compute_entity_aabbs(&mut self) {
        for entity in &mut self.entities {
            let mut aabb = Aabb::empty();
            for &instance in &entity.primitive_instances {
                let primitive = self.primitive_instances[instance.index()].primitive;
                let positions = &self.primitives[primitive.index()].positions;
                if entity.has_reused_primitives {
                    for chunk in positions.chunks_exact(3) {
                        let p = entity
                            .matrix
                            .transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
                        aabb.expand_point(&p);
                    }
                } else {
                    aabb.expand_aabb(&Aabb::from_positions(positions));
                }
            }
            entity.aabb = aabb;
        }
    }

    fn build_tiles(&mut self) {
        if self.entities.is_empty() {
            return;
        }

        let mut root = Aabb::empty();
        for entity in &self.entities {
            root.expand_aabb(&entity.aabb);
        }

        let mut tree = KdTree::new(root, self.config.min_tile_diagonal);
        for (i, entity) in self.entities.iter().enumerate() {
            tree.insert(EntityKey(i as u32), &entity.aabb);
        }

        for group in tree.into_groups() {
            self.create_tile(group);
        }
        tracing::debug!(tiles = self.tiles.len(), "built tiles");
    }

    /// Recentre a group of entities on its bounds and append it as a tile.
    fn create_tile(&mut self, entities: Vec<EntityKey>) {
        let mut aabb = Aabb::empty();
        for key in &entities {
            aabb.expand_aabb(&self.entities[key.index()].aabb);
        }

        let offset = -aabb.center().coords;
        let recentre = Matrix4::new_translation(&offset);
        let rtc_aabb = aabb.translated(&offset);

        for &key in &entities {
            let entity = &mut self.entities[key.index()];
            if entity.has_reused_primitives {
                entity.matrix = recentre * entity.matrix;
            } else {
                for &instance in &entity.primitive_instances {
                    let primitive = self.primitive_instances[instance.index()].primitive;
                    let primitive = &mut self.primitives[primitive.index()];
                    for chunk in primitive.positions.chunks_exact_mut(3) {
                        chunk[0] += offset.x;
                        chunk[1] += offset.y;
                        chunk[2] += offset.z;
                    }
                    primitive.positions_quantized =
                        quantize_positions(&primitive.positions, &rtc_aabb);
                }
            }
            entity.entity_index = Some(self.entity_order.len() as u32);
            self.entity_order.push(key);
        }

        self.tiles.push(Tile { aabb, entities });
    }

    fn quantize_reused_primitives(&mut self) {
        let mut aabb = Aabb::empty();
        for primitive in self.primitives.iter().filter(|p| p.reused()) {
            aabb.expand_aabb(&Aabb::from_positions(&primitive.positions));
        }
        self.reused_primitives_decode_matrix = build_decode_matrix(&aabb);

        for primitive in self.primitives.iter_mut().filter(|p| p.reused()) {
            primitive.positions_quantized = quantize_positions(&primitive.positions, &aabb);
        }
    }

    fn quantize_unused_primitives(&mut self) {
        let mut unused = Vec::new();
        for primitive in self.primitives.iter_mut().filter(|p| p.num_instances == 0) {
            let aabb = Aabb::from_positions(&primitive.positions);
            primitive.positions_quantized = quantize_positions(&primitive.positions, &aabb);
            unused.push(primitive.primitive_id);
        }
        for primitive_id in unused {
            self.record(Diagnostic::UnusedPrimitive { primitive_id });
        }
    }
}
