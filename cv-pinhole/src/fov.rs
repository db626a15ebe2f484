use crate::{CameraIntrinsics, ImageSize};
use cv_core::nalgebra::{Point2, Unit, Vector3};
use cv_core::{Bearing, CameraModel, KeyPoint};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The four side planes of a camera's field of view.
///
/// Every plane passes through the optical center and one border of the image.
/// The normals point into the visible frustum, so a direction `d` out of the
/// optical center is on the visible side of a plane exactly when the angle
/// between `d` and the plane normal is below a right angle (`d · n > 0`).
///
/// ```text
///               up
///          +-----------+
///          |           |
///    left  |     O     |  right
///          |           |
///          +-----------+
///              down
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FieldOfView {
    normals: [Unit<Vector3<f64>>; 4],
}

impl FieldOfView {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const UP: usize = 2;
    pub const DOWN: usize = 3;

    /// Computes the field of view planes of a camera producing images of the given size.
    ///
    /// Returns `None` if the image is empty.
    ///
    /// ```
    /// use cv_core::nalgebra::{Point2, Vector3};
    /// use cv_pinhole::{CameraIntrinsics, FieldOfView, ImageSize};
    /// let intrinsics = CameraIntrinsics::identity()
    ///     .focal(600.0)
    ///     .principal_point(Point2::new(320.0, 240.0));
    /// let fov = FieldOfView::new(&intrinsics, ImageSize::new(640, 480)).unwrap();
    /// assert!(fov.contains(&Vector3::new(0.0, 0.0, 1.0)));
    /// assert!(!fov.contains(&Vector3::new(2.0, 0.0, 1.0)));
    /// ```
    pub fn new(intrinsics: &CameraIntrinsics, size: ImageSize) -> Option<Self> {
        if size.is_empty() {
            return None;
        }
        let width = f64::from(size.width);
        let height = f64::from(size.height);
        let ray = |column: f64, row: f64| {
            intrinsics
                .calibrate(KeyPoint(Point2::new(column, row)))
                .bearing_unnormalized()
        };
        let top_left = ray(0.0, 0.0);
        let top_right = ray(width, 0.0);
        let bottom_left = ray(0.0, height);
        let bottom_right = ray(width, height);
        let center = ray(0.5 * width, 0.5 * height);

        // Orient each plane so the center of the image is on its positive side.
        let inward = |a: Vector3<f64>, b: Vector3<f64>| {
            let normal = a.cross(&b);
            let normal = if normal.dot(&center) < 0.0 {
                -normal
            } else {
                normal
            };
            Unit::try_new(normal, f64::EPSILON)
        };

        Some(Self {
            normals: [
                inward(top_left, bottom_left)?,
                inward(top_right, bottom_right)?,
                inward(top_left, top_right)?,
                inward(bottom_left, bottom_right)?,
            ],
        })
    }

    /// The normals in the order `[left, right, up, down]`.
    pub fn normals(&self) -> &[Unit<Vector3<f64>>; 4] {
        &self.normals
    }

    pub fn left(&self) -> &Unit<Vector3<f64>> {
        &self.normals[Self::LEFT]
    }

    pub fn right(&self) -> &Unit<Vector3<f64>> {
        &self.normals[Self::RIGHT]
    }

    pub fn up(&self) -> &Unit<Vector3<f64>> {
        &self.normals[Self::UP]
    }

    pub fn down(&self) -> &Unit<Vector3<f64>> {
        &self.normals[Self::DOWN]
    }

    /// Checks if a direction out of the optical center is inside all four planes.
    pub fn contains(&self, direction: &Vector3<f64>) -> bool {
        self.normals.iter().all(|normal| normal.dot(direction) > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn intrinsics() -> CameraIntrinsics {
        CameraIntrinsics::identity()
            .focal(600.0)
            .principal_point(Point2::new(320.0, 240.0))
    }

    #[test]
    fn normals_point_inwards() {
        let fov = FieldOfView::new(&intrinsics(), ImageSize::new(640, 480)).unwrap();
        assert!(fov.left().x > 0.0);
        assert!(fov.right().x < 0.0);
        assert!(fov.up().y > 0.0);
        assert!(fov.down().y < 0.0);
        // With a centered principal point the planes are symmetric.
        assert_relative_eq!(fov.left().x, -fov.right().x, epsilon = 1e-12);
        assert_relative_eq!(fov.up().y, -fov.down().y, epsilon = 1e-12);
    }

    #[test]
    fn left_plane_contains_left_border() {
        let fov = FieldOfView::new(&intrinsics(), ImageSize::new(640, 480)).unwrap();
        let border = intrinsics()
            .calibrate(KeyPoint(Point2::new(0.0, 100.0)))
            .bearing_unnormalized();
        assert_relative_eq!(fov.left().dot(&border), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_image_has_no_fov() {
        assert!(FieldOfView::new(&intrinsics(), ImageSize::new(0, 480)).is_none());
    }

    proptest! {
        #[test]
        fn pixels_inside_image_are_inside_fov(column in 1.0..639.0f64, row in 1.0..479.0f64) {
            let fov = FieldOfView::new(&intrinsics(), ImageSize::new(640, 480)).unwrap();
            let direction = intrinsics()
                .calibrate(KeyPoint(Point2::new(column, row)))
                .bearing_unnormalized();
            prop_assert!(fov.contains(&direction));
        }
    }
}
