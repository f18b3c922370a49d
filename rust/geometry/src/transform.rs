// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared transform utilities
//!
//! Modeling matrices are column-major `Matrix4<f64>` values that map local
//! coordinates to world coordinates.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

/// Compose a modeling matrix from translation, per-axis scale and XYZ Euler
/// rotation angles in degrees
///
/// The result is `T * Rx * Ry * Rz * S`.
pub fn compose_trs(
    position: &Vector3<f64>,
    scale: &Vector3<f64>,
    rotation_degrees: &Vector3<f64>,
) -> Matrix4<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation_degrees.x.to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation_degrees.y.to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), rotation_degrees.z.to_radians());
    let rotation = (rx * ry * rz).to_homogeneous();

    Matrix4::new_translation(position) * rotation * Matrix4::new_nonuniform_scaling(scale)
}

/// Check whether a matrix is exactly the identity
#[inline]
pub fn is_identity(matrix: &Matrix4<f64>) -> bool {
    *matrix == Matrix4::identity()
}

/// Inverse-transpose of a modeling matrix, for transforming normals
///
/// Singular matrices have no inverse; the identity is used instead so the
/// normals pass through unchanged.
pub fn normal_matrix(matrix: &Matrix4<f64>) -> Matrix4<f64> {
    matrix
        .try_inverse()
        .unwrap_or_else(Matrix4::identity)
        .transpose()
}

/// Transform a flat `[x, y, z, ...]` position buffer in place
pub fn transform_positions(matrix: &Matrix4<f64>, positions: &mut [f64]) {
    for chunk in positions.chunks_exact_mut(3) {
        let p = matrix.transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
        chunk[0] = p.x;
        chunk[1] = p.y;
        chunk[2] = p.z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_identity() {
        let m = compose_trs(&Vector3::zeros(), &Vector3::repeat(1.0), &Vector3::zeros());
        assert!(is_identity(&m));
    }

    #[test]
    fn test_compose_translate_scale() {
        let m = compose_trs(
            &Vector3::new(10.0, 20.0, 30.0),
            &Vector3::new(2.0, 3.0, 4.0),
            &Vector3::zeros(),
        );
        let p = m.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(12.0, 23.0, 34.0));
    }

    #[test]
    fn test_compose_rotation_degrees() {
        let m = compose_trs(
            &Vector3::zeros(),
            &Vector3::repeat(1.0),
            &Vector3::new(0.0, 0.0, 90.0),
        );
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        // A plane tilted 45 degrees, squashed along X: the normal must stay
        // perpendicular to the transformed surface
        let m = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let tangent = m.transform_vector(&Vector3::new(1.0, -1.0, 0.0));
        let normal = normal_matrix(&m).transform_vector(&Vector3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(tangent.dot(&normal), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_matrix_singular_falls_back() {
        let m = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 0.0, 1.0));
        assert!(is_identity(&normal_matrix(&m)));
    }

    #[test]
    fn test_transform_positions() {
        let m = Matrix4::new_translation(&Vector3::new(1.0, 0.0, -1.0));
        let mut positions = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        transform_positions(&m, &mut positions);
        assert_eq!(positions, vec![1.0, 0.0, -1.0, 2.0, 2.0, 2.0]);
    }
}
