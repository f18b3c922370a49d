// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! KD-tree used to group entities into tiles.
//!
//! Nodes live in a flat arena and link to children by index. The tree only
//! exists during [`crate::XktModel::finalize`]; once the entity groups have
//! been read out in pre-order it is dropped.

use xkt_lite_geometry::Aabb;

use crate::entity::EntityKey;

#[derive(Debug, Clone)]
struct KdNode {
    aabb: Aabb,
    left: Option<usize>,
    right: Option<usize>,
    entities: Vec<EntityKey>,
}

impl KdNode {
    fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            left: None,
            right: None,
            entities: Vec::new(),
        }
    }
}

/// Which side of a split a new child covers.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[derive(Debug)]
pub(crate) struct KdTree {
    nodes: Vec<KdNode>,
    min_diagonal: f64,
}

/// Longest axis of `aabb`, later axes winning only on strictly greater size.
fn split_axis(aabb: &Aabb) -> usize {
    let size = aabb.size();
    let mut dim = 0;
    if size.y > size.x {
        dim = 1;
    }
    if size.z > size.y {
        dim = 2;
    }
    dim
}

impl KdTree {
    pub(crate) fn new(root: Aabb, min_diagonal: f64) -> Self {
        Self {
            nodes: vec![KdNode::new(root)],
            min_diagonal,
        }
    }

    #[cfg(test)]
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Place an entity in the deepest node that fully contains it.
    pub(crate) fn insert(&mut self, entity: EntityKey, aabb: &Aabb) {
        let mut node = 0;
        loop {
            let node_aabb = self.nodes[node].aabb;

            if node_aabb.diagonal() < self.min_diagonal {
                self.store(node, entity, aabb);
                return;
            }

            if let Some(next) = self.existing_child(node, aabb) {
                node = next;
                continue;
            }

            let dim = split_axis(&node_aabb);
            let mid = (node_aabb.min[dim] + node_aabb.max[dim]) / 2.0;

            if let Some(next) = self.split_child(node, Side::Left, dim, mid, aabb) {
                node = next;
                continue;
            }
            if let Some(next) = self.split_child(node, Side::Right, dim, mid, aabb) {
                node = next;
                continue;
            }

            // Straddles the split plane
            self.store(node, entity, aabb);
            return;
        }
    }

    fn store(&mut self, node: usize, entity: EntityKey, aabb: &Aabb) {
        let node = &mut self.nodes[node];
        node.entities.push(entity);
        node.aabb.expand_aabb(aabb);
    }

    fn existing_child(&self, node: usize, aabb: &Aabb) -> Option<usize> {
        let n = &self.nodes[node];
        [n.left, n.right]
            .into_iter()
            .flatten()
            .find(|&child| self.nodes[child].aabb.contains(aabb))
    }

    /// Create the child on `side` if it is missing, returning it when it
    /// contains `aabb`.
    fn split_child(
        &mut self,
        node: usize,
        side: Side,
        dim: usize,
        mid: f64,
        aabb: &Aabb,
    ) -> Option<usize> {
        let slot = match side {
            Side::Left => self.nodes[node].left,
            Side::Right => self.nodes[node].right,
        };
        if slot.is_some() {
            return None;
        }

        let mut child_aabb = self.nodes[node].aabb;
        match side {
            Side::Left => child_aabb.max[dim] = mid,
            Side::Right => child_aabb.min[dim] = mid,
        }

        let child = self.nodes.len();
        self.nodes.push(KdNode::new(child_aabb));
        match side {
            Side::Left => self.nodes[node].left = Some(child),
            Side::Right => self.nodes[node].right = Some(child),
        }

        child_aabb.contains(aabb).then_some(child)
    }

    /// Entity groups of every non-empty node, in pre-order.
    pub(crate) fn into_groups(mut self) -> Vec<Vec<EntityKey>> {
        let mut groups = Vec::new();
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            let n = &mut self.nodes[node];
            if !n.entities.is_empty() {
                groups.push(std::mem::take(&mut n.entities));
            }
            if let Some(right) = n.right {
                stack.push(right);
            }
            if let Some(left) = n.left {
                stack.push(left);
            }
        }
        groups
    }
}
