// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge extraction for wireframe overlays
//!
//! Meshes usually duplicate vertices along creases (one copy per face normal),
//! so topology is recovered by welding first: positions are hashed at four
//! decimal places and every distinct key gets a welded index. Each undirected
//! welded edge then records the faces on either side. An edge is emitted when
//! it borders a single face, or when the angle between its two face normals
//! exceeds the threshold.
//!
//! Edges shared by more than two faces are not treated specially: the last
//! face seen becomes the second face.

use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Crease angle used when none is configured
pub const DEFAULT_EDGE_THRESHOLD_DEGREES: f64 = 10.0;

/// Weld key precision (4 decimal places)
const WELD_PRECISION: f64 = 10_000.0;

/// Edge index buffer, 16-bit unless an index exceeds 65535
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeIndices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl EdgeIndices {
    /// Number of indices (two per edge)
    pub fn len(&self) -> usize {
        match self {
            EdgeIndices::U16(v) => v.len(),
            EdgeIndices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the indices widened to u32
    pub fn iter_u32(&self) -> EdgeIndicesIter<'_> {
        match self {
            EdgeIndices::U16(v) => EdgeIndicesIter::U16(v.iter()),
            EdgeIndices::U32(v) => EdgeIndicesIter::U32(v.iter()),
        }
    }

    pub fn to_u32_vec(&self) -> Vec<u32> {
        self.iter_u32().collect()
    }
}

/// Iterator over [`EdgeIndices`] as u32, see [`EdgeIndices::iter_u32`]
#[derive(Debug, Clone)]
pub enum EdgeIndicesIter<'a> {
    U16(std::slice::Iter<'a, u16>),
    U32(std::slice::Iter<'a, u32>),
}

impl Iterator for EdgeIndicesIter<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        match self {
            EdgeIndicesIter::U16(it) => it.next().map(|&i| i as u32),
            EdgeIndicesIter::U32(it) => it.next().copied(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            EdgeIndicesIter::U16(it) => it.size_hint(),
            EdgeIndicesIter::U32(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for EdgeIndicesIter<'_> {}

impl Default for EdgeIndices {
    fn default() -> Self {
        EdgeIndices::U16(Vec::new())
    }
}

/// Result of welding a mesh's vertices
struct WeldedMesh {
    /// One position per welded vertex
    unique_positions: Vec<Point3<f64>>,
    /// Triangle index buffer rewritten to welded indices
    welded_indices: Vec<u32>,
    /// Welded index -> an original index that maps to it
    representatives: Vec<u32>,
}

fn weld_vertices(positions: &[f64], indices: &[u32]) -> WeldedMesh {
    let vertex_count = positions.len() / 3;
    let mut key_to_welded: FxHashMap<(i64, i64, i64), u32> = FxHashMap::default();
    let mut unique_positions = Vec::new();
    let mut lookup = Vec::with_capacity(vertex_count);

    for chunk in positions.chunks_exact(3) {
        let key = (
            (chunk[0] * WELD_PRECISION).round() as i64,
            (chunk[1] * WELD_PRECISION).round() as i64,
            (chunk[2] * WELD_PRECISION).round() as i64,
        );
        let welded = *key_to_welded.entry(key).or_insert_with(|| {
            unique_positions.push(Point3::new(chunk[0], chunk[1], chunk[2]));
            (unique_positions.len() - 1) as u32
        });
        lookup.push(welded);
    }

    let welded_indices: Vec<u32> = indices.iter().map(|&i| lookup[i as usize]).collect();
    let mut representatives = vec![0u32; unique_positions.len()];
    for (&welded, &original) in welded_indices.iter().zip(indices) {
        representatives[welded as usize] = original;
    }

    WeldedMesh {
        unique_positions,
        welded_indices,
        representatives,
    }
}

fn face_normals(welded: &WeldedMesh, decode_matrix: Option<&Matrix4<f64>>) -> Vec<Vector3<f64>> {
    let point = |i: u32| {
        let p = welded.unique_positions[i as usize];
        match decode_matrix {
            Some(m) => m.transform_point(&p),
            None => p,
        }
    };

    welded
        .welded_indices
        .chunks_exact(3)
        .map(|tri| {
            let a = point(tri[0]);
            let b = point(tri[1]);
            let c = point(tri[2]);
            let cross = (c - b).cross(&(a - b));
            let len = cross.norm();
            if len > 0.0 {
                cross / len
            } else {
                Vector3::zeros()
            }
        })
        .collect()
}

struct EdgeFaces {
    index1: u32,
    index2: u32,
    face1: usize,
    face2: Option<usize>,
}

/// Extract boundary and crease edges from a triangle mesh
///
/// # Arguments
/// * `positions` - Flat `[x, y, z, ...]` positions. May hold quantized values,
///   in which case `decode_matrix` maps them to real coordinates for the
///   face normal calculation.
/// * `indices` - Triangle index buffer
/// * `decode_matrix` - Dequantization matrix for `positions`, if any
/// * `threshold_degrees` - Minimum dihedral angle for an interior edge to be kept
///
/// # Returns
/// Pairs of original vertex indices, in the order each edge was first seen.
pub fn build_edge_indices(
    positions: &[f64],
    indices: &[u32],
    decode_matrix: Option<&Matrix4<f64>>,
    threshold_degrees: f64,
) -> Result<EdgeIndices> {
    if positions.len() % 3 != 0 {
        return Err(Error::InvalidPositions(positions.len()));
    }
    if indices.len() % 3 != 0 {
        return Err(Error::InvalidIndices(indices.len()));
    }
    let vertex_count = positions.len() / 3;
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    let welded = weld_vertices(positions, indices);
    let normals = face_normals(&welded, decode_matrix);
    let threshold_dot = threshold_degrees.to_radians().cos();

    // Insertion-ordered edge table keyed by canonical welded pair
    let mut edges: Vec<EdgeFaces> = Vec::new();
    let mut edge_lookup: FxHashMap<(u32, u32), usize> = FxHashMap::default();

    for (face, tri) in welded.welded_indices.chunks_exact(3).enumerate() {
        for j in 0..3 {
            let e1 = tri[j];
            let e2 = tri[(j + 1) % 3];
            let key = (e1.min(e2), e1.max(e2));
            match edge_lookup.get(&key) {
                Some(&slot) => edges[slot].face2 = Some(face),
                None => {
                    edge_lookup.insert(key, edges.len());
                    edges.push(EdgeFaces {
                        index1: key.0,
                        index2: key.1,
                        face1: face,
                        face2: None,
                    });
                }
            }
        }
    }

    let mut edge_indices: Vec<u32> = Vec::new();
    let mut large_index = false;

    for edge in &edges {
        if let Some(face2) = edge.face2 {
            let dot = normals[edge.face1].dot(&normals[face2]);
            if dot >= threshold_dot {
                continue;
            }
        }
        let ia = welded.representatives[edge.index1 as usize];
        let ib = welded.representatives[edge.index2 as usize];
        if ia > u16::MAX as u32 || ib > u16::MAX as u32 {
            large_index = true;
        }
        edge_indices.push(ia);
        edge_indices.push(ib);
    }

    Ok(if large_index {
        EdgeIndices::U32(edge_indices)
    } else {
        EdgeIndices::U16(edge_indices.into_iter().map(|i| i as u16).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::Aabb;
    use crate::codec::{build_decode_matrix, quantize_positions};
    use std::collections::BTreeSet;

    /// Unit cube with 8 shared vertices (index = x + 2y + 4z)
    fn cube_shared() -> (Vec<f64>, Vec<u32>) {
        let mut positions = Vec::new();
        for i in 0..8u32 {
            positions.push((i & 1) as f64);
            positions.push(((i >> 1) & 1) as f64);
            positions.push(((i >> 2) & 1) as f64);
        }
        let quads: [[u32; 4]; 6] = [
            [0, 2, 3, 1],
            [4, 5, 7, 6],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [1, 3, 7, 5],
        ];
        let mut indices = Vec::new();
        for q in quads {
            indices.extend_from_slice(&[q[0], q[1], q[2], q[0], q[2], q[3]]);
        }
        (positions, indices)
    }

    /// Same cube with 4 separate vertices per face, as exporters emit it
    fn cube_split() -> (Vec<f64>, Vec<u32>) {
        let (shared_positions, shared_indices) = cube_shared();
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for face in shared_indices.chunks_exact(6) {
            let base = (positions.len() / 3) as u32;
            let quad = [face[0], face[1], face[2], face[5]];
            for &v in &quad {
                let v = v as usize;
                positions.extend_from_slice(&shared_positions[v * 3..v * 3 + 3]);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        (positions, indices)
    }

    fn edge_set(edges: &EdgeIndices, positions: &[f64]) -> BTreeSet<(u64, u64)> {
        // Compare by position bits so split and shared cubes are comparable
        let key = |i: u32| {
            let p = &positions[i as usize * 3..i as usize * 3 + 3];
            (p[0] as u64) | ((p[1] as u64) << 1) | ((p[2] as u64) << 2)
        };
        edges
            .to_u32_vec()
            .chunks_exact(2)
            .map(|e| {
                let (a, b) = (key(e[0]), key(e[1]));
                (a.min(b), a.max(b))
            })
            .collect()
    }

    fn expected_cube_edges() -> BTreeSet<(u64, u64)> {
        let mut set = BTreeSet::new();
        for a in 0..8u64 {
            for bit in [1u64, 2, 4] {
                let b = a ^ bit;
                set.insert((a.min(b), a.max(b)));
            }
        }
        set
    }

    #[test]
    fn test_cube_emits_twelve_edges() {
        let (positions, indices) = cube_shared();
        let edges = build_edge_indices(&positions, &indices, None, 10.0).unwrap();
        assert_eq!(edges.len(), 24);
        assert_eq!(edge_set(&edges, &positions), expected_cube_edges());
    }

    #[test]
    fn test_split_cube_is_welded() {
        let (positions, indices) = cube_split();
        assert_eq!(positions.len(), 24 * 3);
        let edges = build_edge_indices(&positions, &indices, None, 10.0).unwrap();
        assert_eq!(edges.len(), 24);
        assert_eq!(edge_set(&edges, &positions), expected_cube_edges());
    }

    #[test]
    fn test_single_triangle_has_three_boundary_edges() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let edges = build_edge_indices(&positions, &[0, 1, 2], None, 10.0).unwrap();
        assert_eq!(edges, EdgeIndices::U16(vec![0, 1, 1, 2, 0, 2]));
    }

    fn folded_pair(angle_degrees: f64) -> Vec<f64> {
        // Two triangles hinged on the X axis, the second lifted by `angle`
        let (s, c) = angle_degrees.to_radians().sin_cos();
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            0.5, -c, s,
        ]
    }

    #[test]
    fn test_shallow_fold_is_suppressed() {
        let positions = folded_pair(5.0);
        let edges = build_edge_indices(&positions, &[0, 1, 2, 1, 0, 3], None, 10.0).unwrap();
        assert_eq!(edges.len(), 8);
    }

    #[test]
    fn test_sharp_fold_is_kept() {
        let positions = folded_pair(30.0);
        let edges = build_edge_indices(&positions, &[0, 1, 2, 1, 0, 3], None, 10.0).unwrap();
        assert_eq!(edges.len(), 10);
    }

    #[test]
    fn test_quantized_input_with_decode_matrix() {
        let (positions, indices) = cube_shared();
        let aabb = Aabb::from_positions(&positions);
        let quantized: Vec<f64> = quantize_positions(&positions, &aabb)
            .into_iter()
            .map(|q| q as f64)
            .collect();
        let decode = build_decode_matrix(&aabb);
        let edges = build_edge_indices(&quantized, &indices, Some(&decode), 10.0).unwrap();
        assert_eq!(edges.len(), 24);
    }

    #[test]
    fn test_large_indices_use_u32() {
        let vertex_count = 70_000usize;
        let mut positions = vec![0.0; vertex_count * 3];
        let last = vertex_count - 3;
        positions[last * 3..].copy_from_slice(&[0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        let tri = [last as u32, last as u32 + 1, last as u32 + 2];
        let edges = build_edge_indices(&positions, &tri, None, 10.0).unwrap();
        match edges {
            EdgeIndices::U32(v) => assert_eq!(v.len(), 6),
            EdgeIndices::U16(_) => panic!("expected 32-bit edge indices"),
        }
    }

    #[test]
    fn test_iter_u32_widens_both_widths() {
        let narrow = EdgeIndices::U16(vec![0, 7, 65_535]);
        let it = narrow.iter_u32();
        assert_eq!(it.len(), 3);
        assert_eq!(it.collect::<Vec<_>>(), vec![0, 7, 65_535]);

        let wide = EdgeIndices::U32(vec![70_000, 1]);
        let mut it = wide.iter_u32();
        assert_eq!(it.next(), Some(70_000));
        assert_eq!(it.size_hint(), (1, Some(1)));
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next(), None);

        assert_eq!(EdgeIndices::default().iter_u32().count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let err = build_edge_indices(&positions, &[0, 1, 3], None, 10.0).unwrap_err();
        assert_eq!(
            err,
            Error::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }
}
