// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes in f64 precision
//!
//! A freshly created box is *empty* (min = +MAX, max = -MAX), which makes
//! it the identity for [`Aabb::expand_point`] and [`Aabb::expand_aabb`].

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create an empty box that contains nothing
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Build from `[minX, minY, minZ, maxX, maxY, maxZ]`
    #[inline]
    pub fn from_array(a: [f64; 6]) -> Self {
        Self {
            min: Point3::new(a[0], a[1], a[2]),
            max: Point3::new(a[3], a[4], a[5]),
        }
    }

    /// Bounds of a flat `[x, y, z, x, y, z, ...]` position buffer
    pub fn from_positions(positions: &[f64]) -> Self {
        let mut aabb = Self::empty();
        for chunk in positions.chunks_exact(3) {
            aabb.expand_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
        }
        aabb
    }

    /// True until at least one point has been added
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn expand_point(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    #[inline]
    pub fn expand_aabb(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.expand_point(&other.min);
        self.expand_point(&other.max);
    }

    /// Inclusive containment test. An empty box is contained in anything.
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.x <= other.min.x
            && other.max.x <= self.max.x
            && self.min.y <= other.min.y
            && other.max.y <= self.max.y
            && self.min.z <= other.min.z
            && other.max.z <= self.max.z
    }

    #[inline]
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Extent along each axis (zero for an empty box)
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Center point (origin for an empty box)
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the min-to-max diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Copy of this box moved by `offset`
    #[inline]
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min + *offset,
            max: self.max + *offset,
        }
    }

    /// Flatten to `[minX, minY, minZ, maxX, maxY, maxZ]`
    #[inline]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
