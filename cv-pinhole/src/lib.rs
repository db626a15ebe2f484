//! This crate plugs into `cv-core` and provides the pinhole camera model used by the tracker.
//! It converts between pixel coordinates and normalized image coordinates, and it can
//! precompute the four side planes of the camera's field of view so that geometry can be
//! clipped against the visible frustum.

#![no_std]

mod fov;

pub use fov::*;

use cv_core::nalgebra::{Matrix3, Point2, Vector2, Vector3};
use cv_core::{Bearing, CameraModel, CameraPoint, ImagePoint, KeyPoint};
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A point in normalized image coordinates. This keypoint has been
/// normalized based on the camera intrinsic matrix, so it lies on the
/// virtual image plane at depth `1.0`: `(x, y) = (X / Z, Y / Z)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct NormalizedKeyPoint(pub Point2<f64>);

impl NormalizedKeyPoint {
    /// Tries to convert the [`CameraPoint`] into a [`NormalizedKeyPoint`].
    ///
    /// Returns `None` when the point lies in the plane of the optical center (`Z == 0`).
    ///
    /// ```
    /// use cv_core::CameraPoint;
    /// use cv_pinhole::NormalizedKeyPoint;
    /// let nkp = NormalizedKeyPoint::from_camera_point(CameraPoint::new(1.0, -2.0, 4.0)).unwrap();
    /// assert_eq!((nkp.x, nkp.y), (0.25, -0.5));
    /// assert!(NormalizedKeyPoint::from_camera_point(CameraPoint::new(1.0, 1.0, 0.0)).is_none());
    /// ```
    pub fn from_camera_point(point: CameraPoint) -> Option<Self> {
        Point2::from_homogeneous(point.0.coords).map(Self)
    }
}

impl Bearing for NormalizedKeyPoint {
    fn bearing_unnormalized(&self) -> Vector3<f64> {
        self.0.coords.push(1.0)
    }
}

/// This contains intrinsic camera parameters as per
/// [this Wikipedia page](https://en.wikipedia.org/wiki/Camera_resectioning#Intrinsic_parameters).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraIntrinsics {
    pub focals: Vector2<f64>,
    pub principal_point: Point2<f64>,
    pub skew: f64,
}

impl CameraIntrinsics {
    /// Creates camera intrinsics that would create an identity intrinsic matrix.
    /// This would imply that the pixel positions have an origin at `0,0`,
    /// the pixel distance unit is the focal length, pixels are square,
    /// and there is no skew.
    pub fn identity() -> Self {
        Self {
            focals: Vector2::new(1.0, 1.0),
            skew: 0.0,
            principal_point: Point2::new(0.0, 0.0),
        }
    }

    pub fn focals(self, focals: Vector2<f64>) -> Self {
        Self { focals, ..self }
    }

    pub fn focal(self, focal: f64) -> Self {
        Self {
            focals: Vector2::new(focal, focal),
            ..self
        }
    }

    pub fn principal_point(self, principal_point: Point2<f64>) -> Self {
        Self {
            principal_point,
            ..self
        }
    }

    pub fn skew(self, skew: f64) -> Self {
        Self { skew, ..self }
    }

    #[rustfmt::skip]
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.focals.x,  self.skew,      self.principal_point.x,
            0.0,            self.focals.y,  self.principal_point.y,
            0.0,            0.0,            1.0,
        )
    }
}

impl CameraModel for CameraIntrinsics {
    type Projection = NormalizedKeyPoint;

    /// Takes in a point from an image in pixel coordinates and
    /// converts it to a [`NormalizedKeyPoint`].
    ///
    /// ```
    /// use cv_core::{KeyPoint, CameraModel};
    /// use cv_pinhole::CameraIntrinsics;
    /// use cv_core::nalgebra::{Vector2, Point2};
    /// let intrinsics = CameraIntrinsics {
    ///     focals: Vector2::new(800.0, 900.0),
    ///     principal_point: Point2::new(500.0, 600.0),
    ///     skew: 1.7,
    /// };
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let nkp = intrinsics.calibrate(kp);
    /// let distance = (kp.to_homogeneous() - intrinsics.matrix() * nkp.to_homogeneous()).norm();
    /// assert!(distance < 0.1);
    /// ```
    fn calibrate<P>(&self, point: P) -> NormalizedKeyPoint
    where
        P: ImagePoint,
    {
        let centered = point.image_point() - self.principal_point;
        let y = centered.y / self.focals.y;
        let x = (centered.x - self.skew * y) / self.focals.x;
        NormalizedKeyPoint(Point2::new(x, y))
    }

    /// Converts a [`NormalizedKeyPoint`] back into pixel coordinates.
    ///
    /// ```
    /// use cv_core::{KeyPoint, CameraModel};
    /// use cv_pinhole::CameraIntrinsics;
    /// use cv_core::nalgebra::{Vector2, Point2};
    /// let intrinsics = CameraIntrinsics {
    ///     focals: Vector2::new(800.0, 900.0),
    ///     principal_point: Point2::new(500.0, 600.0),
    ///     skew: 1.7,
    /// };
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let ukp = intrinsics.uncalibrate(intrinsics.calibrate(kp));
    /// assert!((kp.0 - ukp.0).norm() < 1e-6);
    /// ```
    fn uncalibrate(&self, projection: NormalizedKeyPoint) -> KeyPoint {
        let y = projection.y * self.focals.y;
        let x = projection.x * self.focals.x + self.skew * projection.y;
        let centered = Point2::new(x, y);
        KeyPoint(centered + self.principal_point.coords)
    }
}

/// The dimensions of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if the pixel lies in `[0, height) x [0, width)`.
    pub fn contains(&self, point: KeyPoint) -> bool {
        point.row() >= 0.0
            && point.column() >= 0.0
            && point.row() < f64::from(self.height)
            && point.column() < f64::from(self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Camera intrinsics together with the optional field of view planes
/// that frustum clipping needs.
///
/// The field of view is only available after [`CameraParameters::compute_fov`]
/// has been called with the size of the images the camera produces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraParameters {
    pub intrinsics: CameraIntrinsics,
    fov: Option<FieldOfView>,
}

impl CameraParameters {
    pub fn new(intrinsics: CameraIntrinsics) -> Self {
        Self {
            intrinsics,
            fov: None,
        }
    }

    /// Computes the field of view normals for images of the given size.
    ///
    /// An empty image size leaves the field of view uncomputed.
    pub fn compute_fov(&mut self, size: ImageSize) {
        self.fov = FieldOfView::new(&self.intrinsics, size);
    }

    /// Builder variant of [`CameraParameters::compute_fov`].
    #[must_use]
    pub fn with_fov(mut self, size: ImageSize) -> Self {
        self.compute_fov(size);
        self
    }

    pub fn is_fov_computed(&self) -> bool {
        self.fov.is_some()
    }

    pub fn fov(&self) -> Option<&FieldOfView> {
        self.fov.as_ref()
    }
}

impl From<CameraIntrinsics> for CameraParameters {
    fn from(intrinsics: CameraIntrinsics) -> Self {
        Self::new(intrinsics)
    }
}

impl CameraModel for CameraParameters {
    type Projection = NormalizedKeyPoint;

    fn calibrate<P>(&self, point: P) -> NormalizedKeyPoint
    where
        P: ImagePoint,
    {
        self.intrinsics.calibrate(point)
    }

    fn uncalibrate(&self, projection: NormalizedKeyPoint) -> KeyPoint {
        self.intrinsics.uncalibrate(projection)
    }
}
