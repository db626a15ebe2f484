use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Something which describes a direction out of the optical center of a camera.
pub trait Bearing {
    /// Retrieve the unnormalized bearing.
    fn bearing_unnormalized(&self) -> Vector3<f64>;
}

/// A 3d point which is relative to the camera's optical center and orientation where
/// the positive X axis is right, positive Y axis is down, and positive Z axis is forwards
/// from the optical center of the camera.
///
/// The `z` component is the depth of the point along the viewing direction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraPoint(pub Point3<f64>);

impl Default for CameraPoint {
    /// The optical center.
    fn default() -> Self {
        Self(Point3::origin())
    }
}

impl CameraPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Point3::new(x, y, z))
    }

    /// The depth of the point along the optical axis.
    pub fn depth(&self) -> f64 {
        self.0.z
    }
}

/// A point in the frame of a tracked object, usually a corner of its CAD model.
///
/// Object points never change while tracking. Only the pose relating the object
/// to the camera does.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObjectPoint(pub Point3<f64>);

impl Default for ObjectPoint {
    /// The origin of the object frame.
    fn default() -> Self {
        Self(Point3::origin())
    }
}

impl ObjectPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Point3::new(x, y, z))
    }
}
