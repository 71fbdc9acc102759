use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box defined by its minimum and maximum extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl AABB {
    /// Creates a new [`AABB`] that contains nothing (min: `f32::MAX`, max: `f32::MIN`).
    ///
    /// # Examples
    ///
    /// ```
    /// # use forge_shared::bounding_box::AABB;
    /// let bounding_box = AABB::empty();
    /// assert!(bounding_box.is_empty());
    /// ```
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vector3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    /// Creates a new [`AABB`] that contains the given `points`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use forge_shared::nalgebra::Vector3;
    /// # use forge_shared::bounding_box::AABB;
    /// # use forge_shared::float_cmp::assert_approx_eq;
    /// let bounding_box = AABB::from_slice(&[
    ///     Vector3::new(0.0, 0.0, 0.0),
    ///     Vector3::new(1.0, 2.0, 3.0),
    ///     Vector3::new(-4.0, -5.0, -6.0),
    /// ]);
    /// assert_approx_eq!(f32, bounding_box.min.x, -4.0, ulps = 1);
    /// assert_approx_eq!(f32, bounding_box.max.z, 3.0, ulps = 1);
    /// ```
    pub fn from_slice(points: &[Vector3<f32>]) -> Self {
        let mut bounding_box = Self::empty();
        bounding_box.extend(points);
        bounding_box
    }

    /// Inserts the given `point` into the [`AABB`] expanding it if necessary.
    pub fn add(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Inserts all given `points` into the [`AABB`] expanding it if necessary.
    pub fn extend(&mut self, points: &[Vector3<f32>]) {
        for point in points {
            self.add(*point);
        }
    }

    /// Checks whether the [`AABB`] contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the side lengths of the [`AABB`], or zero when it is empty.
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}
