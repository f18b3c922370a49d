// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry compression codecs
//!
//! Two lossy encodings are used by the XKT format:
//!
//! - **Positions** are quantized to unsigned 16-bit integers relative to an
//!   axis-aligned box. A decode matrix (`translate(min) * scale(size / 65535)`)
//!   maps them back, with an error of at most one quantization step per axis.
//! - **Normals** are octahedrally encoded into two signed bytes. Plain rounding
//!   can pick a cell whose decoded direction is not the closest one, so every
//!   normal is encoded four times (floor/ceil on each component) and the
//!   candidate with the largest dot product against the input wins.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::aabb::Aabb;

/// Largest quantized coordinate value
pub const QUANTIZE_MAX: f64 = 65535.0;

/// Quantize a flat position buffer to 16-bit integers relative to `aabb`
///
/// Each component becomes `floor((p - min) * 65535 / (max - min))`. Values
/// below the box clamp to 0 and values above clamp to 65535. An axis with zero
/// width quantizes every value to 0; [`build_decode_matrix`] gives that axis a
/// zero scale so it decodes back to `min`.
pub fn quantize_positions(positions: &[f64], aabb: &Aabb) -> Vec<u16> {
    let size = aabb.size();
    let multiplier = |width: f64| if width > 0.0 { QUANTIZE_MAX / width } else { 0.0 };
    let mx = multiplier(size.x);
    let my = multiplier(size.y);
    let mz = multiplier(size.z);

    let mut quantized = Vec::with_capacity(positions.len());
    for chunk in positions.chunks_exact(3) {
        quantized.push(quantize_component(chunk[0] - aabb.min.x, mx));
        quantized.push(quantize_component(chunk[1] - aabb.min.y, my));
        quantized.push(quantize_component(chunk[2] - aabb.min.z, mz));
    }
    quantized
}

#[inline]
fn quantize_component(offset: f64, multiplier: f64) -> u16 {
    (offset.max(0.0) * multiplier).floor().min(QUANTIZE_MAX) as u16
}

/// Matrix that maps quantized positions back into the space of `aabb`
pub fn build_decode_matrix(aabb: &Aabb) -> Matrix4<f64> {
    if aabb.is_empty() {
        return Matrix4::identity();
    }
    let translate = Matrix4::new_translation(&aabb.min.coords);
    let scale = Matrix4::new_nonuniform_scaling(&(aabb.size() / QUANTIZE_MAX));
    translate * scale
}

/// Decode a single quantized position
#[inline]
pub fn decompress_position(quantized: [u16; 3], decode_matrix: &Matrix4<f64>) -> Point3<f64> {
    decode_matrix.transform_point(&Point3::new(
        quantized[0] as f64,
        quantized[1] as f64,
        quantized[2] as f64,
    ))
}

/// Decode a flat quantized position buffer back to floats
pub fn decompress_positions(quantized: &[u16], decode_matrix: &Matrix4<f64>) -> Vec<f64> {
    let mut positions = Vec::with_capacity(quantized.len());
    for chunk in quantized.chunks_exact(3) {
        let p = decompress_position([chunk[0], chunk[1], chunk[2]], decode_matrix);
        positions.extend_from_slice(&[p.x, p.y, p.z]);
    }
    positions
}

#[derive(Clone, Copy)]
enum Rounding {
    Floor,
    Ceil,
}

impl Rounding {
    #[inline]
    fn apply(self, v: f64) -> f64 {
        match self {
            Rounding::Floor => v.floor(),
            Rounding::Ceil => v.ceil(),
        }
    }
}

#[inline]
fn sign_not_zero(v: f64) -> f64 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[inline]
fn to_oct_byte(v: f64, rounding: Rounding) -> i8 {
    let scaled = v * 127.5 + if v < 0.0 { -1.0 } else { 0.0 };
    rounding.apply(scaled).clamp(-128.0, 127.0) as i8
}

fn oct_encode_with(n: &Vector3<f64>, round_x: Rounding, round_y: Rounding) -> [i8; 2] {
    let l1 = n.x.abs() + n.y.abs() + n.z.abs();
    if l1 == 0.0 {
        return [0, 0];
    }
    let mut x = n.x / l1;
    let mut y = n.y / l1;
    if n.z < 0.0 {
        let folded_x = (1.0 - y.abs()) * sign_not_zero(x);
        let folded_y = (1.0 - x.abs()) * sign_not_zero(y);
        x = folded_x;
        y = folded_y;
    }
    [to_oct_byte(x, round_x), to_oct_byte(y, round_y)]
}

/// Octahedrally encode a unit normal into two signed bytes
pub fn oct_encode_normal(n: &Vector3<f64>) -> [i8; 2] {
    const CANDIDATES: [(Rounding, Rounding); 4] = [
        (Rounding::Floor, Rounding::Floor),
        (Rounding::Ceil, Rounding::Floor),
        (Rounding::Floor, Rounding::Ceil),
        (Rounding::Ceil, Rounding::Ceil),
    ];

    let mut best = [0i8; 2];
    let mut best_cos = f64::NEG_INFINITY;
    for (round_x, round_y) in CANDIDATES {
        let oct = oct_encode_with(n, round_x, round_y);
        let cos = n.dot(&oct_decode_normal(oct[0], oct[1]));
        if cos > best_cos {
            best = oct;
            best_cos = cos;
        }
    }
    best
}

/// Decode an oct-encoded normal back to a unit vector
pub fn oct_decode_normal(ox: i8, oy: i8) -> Vector3<f64> {
    let mut x = ox as f64 / if ox < 0 { 127.0 } else { 128.0 };
    let mut y = oy as f64 / if oy < 0 { 127.0 } else { 128.0 };
    let z = 1.0 - x.abs() - y.abs();
    if z < 0.0 {
        let unfolded_x = (1.0 - y.abs()) * sign_not_zero(x);
        let unfolded_y = (1.0 - x.abs()) * sign_not_zero(y);
        x = unfolded_x;
        y = unfolded_y;
    }
    let v = Vector3::new(x, y, z);
    let len = v.norm();
    if len > 0.0 {
        v / len
    } else {
        v
    }
}

/// Oct-encode a flat normal buffer
///
/// Output has the same length as the input: two encoded bytes per vertex
/// followed by a zero padding byte.
pub fn oct_encode_normals(normals: &[f64]) -> Vec<i8> {
    let mut encoded = vec![0i8; normals.len() - normals.len() % 3];
    for (src, dst) in normals.chunks_exact(3).zip(encoded.chunks_exact_mut(3)) {
        let oct = oct_encode_normal(&Vector3::new(src[0], src[1], src[2]));
        dst[0] = oct[0];
        dst[1] = oct[1];
    }
    encoded
}

/// Transform normals by `matrix` (w = 0), renormalize, then oct-encode
///
/// `matrix` is normally the inverse-transpose of a modeling matrix, see
/// [`crate::transform::normal_matrix`].
pub fn transform_and_oct_encode_normals(matrix: &Matrix4<f64>, normals: &[f64]) -> Vec<i8> {
    let mut encoded = vec![0i8; normals.len() - normals.len() % 3];
    for (src, dst) in normals.chunks_exact(3).zip(encoded.chunks_exact_mut(3)) {
        let v = matrix.transform_vector(&Vector3::new(src[0], src[1], src[2]));
        let len = v.norm();
        let n = if len > 0.0 { v / len } else { v };
        let oct = oct_encode_normal(&n);
        dst[0] = oct[0];
        dst[1] = oct[1];
    }
    encoded
}
