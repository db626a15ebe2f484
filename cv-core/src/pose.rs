use crate::{CameraPoint, ObjectPoint};
use derive_more::{AsMut, AsRef, From, Into};
use nalgebra::{IsometryMatrix3, Rotation3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// This trait is implemented by all the different poses in this library:
///
/// * [`ObjectToCamera`] - Transforms [`ObjectPoint`] into [`CameraPoint`]
/// * [`CameraToObject`] - Transforms [`CameraPoint`] into [`ObjectPoint`]
pub trait Pose: From<IsometryMatrix3<f64>> + Clone + Copy {
    type InputPoint: From<nalgebra::Point3<f64>> + Into<nalgebra::Point3<f64>>;
    type OutputPoint: From<nalgebra::Point3<f64>> + Into<nalgebra::Point3<f64>>;
    type Inverse: Pose;

    /// Retrieve the isometry.
    fn isometry(self) -> IsometryMatrix3<f64>;

    /// Creates a pose with no change in position or orientation.
    fn identity() -> Self {
        IsometryMatrix3::identity().into()
    }

    /// Takes the inverse of the pose.
    fn inverse(self) -> Self::Inverse {
        self.isometry().inverse().into()
    }

    /// Create the pose from rotation and translation.
    fn from_parts(translation: Vector3<f64>, rotation: Rotation3<f64>) -> Self {
        IsometryMatrix3::from_parts(translation.into(), rotation).into()
    }

    /// Transform the given point to an output point.
    fn transform(self, input: Self::InputPoint) -> Self::OutputPoint {
        (self.isometry() * input.into()).into()
    }
}

/// The pose of an object relative to the camera, often written `cMo`.
///
/// This maps [`ObjectPoint`] into [`CameraPoint`], changing a position on the
/// object model into a vector relative to the optical center.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObjectToCamera(pub IsometryMatrix3<f64>);

impl Pose for ObjectToCamera {
    type InputPoint = ObjectPoint;
    type OutputPoint = CameraPoint;
    type Inverse = CameraToObject;

    #[inline(always)]
    fn isometry(self) -> IsometryMatrix3<f64> {
        self.into()
    }
}

/// The pose of the camera relative to an object.
/// This transforms camera points (with depth as `z`) into object coordinates.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraToObject(pub IsometryMatrix3<f64>);

impl Pose for CameraToObject {
    type InputPoint = CameraPoint;
    type OutputPoint = ObjectPoint;
    type Inverse = ObjectToCamera;

    #[inline(always)]
    fn isometry(self) -> IsometryMatrix3<f64> {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_round_trip() {
        let pose = ObjectToCamera::from_parts(
            Vector3::new(0.1, -0.2, 1.5),
            Rotation3::from_euler_angles(0.1, 0.2, 0.3),
        );
        let object = ObjectPoint::new(0.3, 0.4, -0.1);
        let camera = pose.transform(object);
        let back = pose.inverse().transform(camera);
        assert_relative_eq!(object.0, back.0, epsilon = 1e-12);
    }

    #[test]
    fn translation_moves_depth() {
        let pose = ObjectToCamera::from_parts(Vector3::new(0.0, 0.0, 2.0), Rotation3::identity());
        let camera = pose.transform(ObjectPoint::new(0.0, 0.0, 0.5));
        assert_relative_eq!(camera.depth(), 2.5);
    }
}
