use crate::{Polygon, ViewPoint};
use core::f64::consts::PI;
use cv_core::nalgebra::Vector3;
use cv_core::ObjectToCamera;
use log::*;

/// Width of the band past the visibility threshold in which a face is reported as appearing.
pub const APPEARING_MARGIN: f64 = PI / 180.0;

/// Computes the angle between the normal of a face and the direction from its centroid
/// to the optical center.
///
/// The normal is taken from the first three corners, so a face with counter-clockwise
/// corners (seen from the camera) that looks straight at the camera has an angle of `0`,
/// and one seen from behind has an angle of `π`.
///
/// Returns `None` for fewer than three corners, collinear leading corners, or a centroid
/// at the optical center.
pub fn viewing_angle(corners: &[ViewPoint]) -> Option<f64> {
    let [a, b, c] = match corners {
        [a, b, c, ..] => [a.camera().coords, b.camera().coords, c.camera().coords],
        _ => return None,
    };
    let e1 = (b - a).try_normalize(f64::EPSILON)?;
    let e2 = (c - b).try_normalize(f64::EPSILON)?;
    let normal = e1.cross(&e2).try_normalize(f64::EPSILON)?;

    let sum: Vector3<f64> = corners.iter().map(|corner| corner.camera().coords).sum();
    let towards_camera = (-sum / corners.len() as f64).try_normalize(f64::EPSILON)?;

    Some(towards_camera.dot(&normal).clamp(-1.0, 1.0).acos())
}

impl Polygon {
    /// Checks whether the polygon faces the camera for the given pose.
    ///
    /// The polygon is visible when its [`viewing_angle`] is below `alpha`. With `wrap_around`
    /// faces seen from behind count as well, which is useful when corner winding is not
    /// consistent across the model. A face which is not visible but within
    /// [`APPEARING_MARGIN`] of the threshold is flagged as appearing.
    ///
    /// The polygon is moved into the camera frame for `pose` as a side effect. Lines are
    /// always visible and never appearing, and are left untouched.
    pub fn is_visible(&mut self, pose: ObjectToCamera, alpha: f64, wrap_around: bool) -> bool {
        if self.corner_count() <= 2 {
            self.visible = true;
            self.appearing = false;
            return true;
        }

        self.transform(pose);
        let Some(angle) = viewing_angle(self.transformed()) else {
            debug!("face {:?} has no viewing angle", self.face_index());
            self.visible = false;
            self.appearing = false;
            return false;
        };

        let within = |threshold: f64| angle < threshold || (wrap_around && PI - angle < threshold);
        self.visible = within(alpha);
        self.appearing = !self.visible && within(alpha + APPEARING_MARGIN);
        trace!(
            "face {:?} seen at {} rad: visible {}, appearing {}",
            self.face_index(),
            angle,
            self.visible,
            self.appearing
        );
        self.visible
    }
}
