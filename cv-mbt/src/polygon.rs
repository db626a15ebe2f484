use crate::clip::{clip_boundary, Frustum};
use crate::{ClipPlanes, ClipSettings, ClippedVertex, PolygonError, ViewPoint};
use cv_core::{CameraPoint, ObjectPoint, ObjectToCamera, Pose};
use cv_pinhole::CameraParameters;
use derive_more::Display;

/// How far a [`Polygon`] has been processed for the current pose.
///
/// Operations that read cached results check the stage and fail with
/// [`PolygonError::Stage`] instead of returning data from an older pose.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The corners have not been moved into the camera frame.
    #[display(fmt = "uninitialized")]
    Uninitialized,
    /// The corners are in the camera frame.
    #[display(fmt = "transformed")]
    Transformed,
    /// The corners are in the camera frame and the clipped boundary is computed.
    #[display(fmt = "clipped")]
    Clipped,
}

/// A face or a line of a tracked object model.
///
/// The corners are given in the object frame. For every tracked frame the polygon is
/// moved into the camera frame with [`Polygon::transform`], after which it can be tested for
/// visibility, clipped against the view frustum, and projected into the image.
///
/// A polygon with two corners is a line segment. It has no closing edge and is always visible.
///
/// ```
/// use cv_core::{ObjectPoint, ObjectToCamera, Pose};
/// use cv_core::nalgebra::{Point2, Rotation3, Vector3};
/// use cv_mbt::{ClipPlanes, Polygon};
/// use cv_pinhole::{CameraIntrinsics, CameraParameters, ImageSize};
///
/// let camera = CameraParameters::new(
///     CameraIntrinsics::identity().focal(600.0).principal_point(Point2::new(320.0, 240.0)),
/// )
/// .with_fov(ImageSize::new(640, 480));
///
/// let mut face = Polygon::from_corners([
///     ObjectPoint::new(-0.1, -0.1, 0.0),
///     ObjectPoint::new(0.1, -0.1, 0.0),
///     ObjectPoint::new(0.1, 0.1, 0.0),
///     ObjectPoint::new(-0.1, 0.1, 0.0),
/// ]);
/// face.set_clip_planes(ClipPlanes::ALL);
///
/// let pose = ObjectToCamera::from_parts(Vector3::new(0.0, 0.0, 1.0), Rotation3::identity());
/// face.transform(pose);
/// face.compute_clipped_boundary(&camera).unwrap();
/// let roi = face.clipped_image_roi(&camera).unwrap();
/// assert_eq!(roi.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    face_index: Option<usize>,
    corners: Vec<ObjectPoint>,
    transformed: Vec<ViewPoint>,
    clipped: Vec<ClippedVertex>,
    stage: Stage,
    pub(crate) visible: bool,
    pub(crate) appearing: bool,
    pub(crate) corners_inside_prev: usize,
    settings: ClipSettings,
}

impl Default for Polygon {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygon {
    /// Creates a polygon without corners and without clipping.
    pub fn new() -> Self {
        Self::with_settings(ClipSettings::default())
    }

    pub fn with_settings(settings: ClipSettings) -> Self {
        Self {
            face_index: None,
            corners: Vec::new(),
            transformed: Vec::new(),
            clipped: Vec::new(),
            stage: Stage::Uninitialized,
            visible: false,
            appearing: false,
            corners_inside_prev: 0,
            settings,
        }
    }

    /// Creates a polygon from its corners in the object frame.
    pub fn from_corners(corners: impl IntoIterator<Item = ObjectPoint>) -> Self {
        Self {
            corners: corners.into_iter().collect(),
            ..Self::new()
        }
    }

    /// The identifier given to the polygon by its owner.
    pub fn face_index(&self) -> Option<usize> {
        self.face_index
    }

    pub fn set_face_index(&mut self, index: usize) {
        self.face_index = Some(index);
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    /// Replaces all corners with `count` corners at the object origin.
    ///
    /// Everything computed for a previous pose is discarded.
    pub fn set_corner_count(&mut self, count: usize) {
        self.corners = vec![ObjectPoint::default(); count];
        self.invalidate();
    }

    /// Sets the object frame position of an existing corner.
    pub fn set_corner(&mut self, index: usize, point: ObjectPoint) -> Result<(), PolygonError> {
        let count = self.corners.len();
        let corner = self
            .corners
            .get_mut(index)
            .ok_or(PolygonError::IndexOutOfRange { index, count })?;
        *corner = point;
        self.invalidate();
        Ok(())
    }

    /// The object frame position of a corner.
    pub fn corner(&self, index: usize) -> Result<ObjectPoint, PolygonError> {
        self.corners
            .get(index)
            .copied()
            .ok_or(PolygonError::IndexOutOfRange {
                index,
                count: self.corners.len(),
            })
    }

    pub fn corners(&self) -> &[ObjectPoint] {
        &self.corners
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The result of the last [`Polygon::is_visible`] call.
    pub fn is_visible_flag(&self) -> bool {
        self.visible
    }

    /// Whether the last [`Polygon::is_visible`] call found the polygon just outside
    /// of the visibility threshold.
    pub fn is_appearing(&self) -> bool {
        self.appearing
    }

    /// The result of the last [`Polygon::count_corners_inside_image`] call.
    pub fn corners_inside_prev_count(&self) -> usize {
        self.corners_inside_prev
    }

    pub fn settings(&self) -> ClipSettings {
        self.settings
    }

    pub fn apply_settings(&mut self, settings: ClipSettings) {
        self.settings = settings;
        self.drop_clipped();
    }

    pub fn clip_planes(&self) -> ClipPlanes {
        self.settings.planes
    }

    pub fn set_clip_planes(&mut self, planes: ClipPlanes) {
        self.settings.planes = planes;
        self.drop_clipped();
    }

    pub fn near_clipping_distance(&self) -> f64 {
        self.settings.near
    }

    pub fn set_near_clipping_distance(&mut self, near: f64) {
        self.settings.near = near;
        self.drop_clipped();
    }

    pub fn far_clipping_distance(&self) -> f64 {
        self.settings.far
    }

    pub fn set_far_clipping_distance(&mut self, far: f64) {
        self.settings.far = far;
        self.drop_clipped();
    }

    /// Moves the corners into the camera frame and projects them onto the image plane.
    ///
    /// Any previously clipped boundary is discarded. Calling this again with the same
    /// pose gives the same result.
    pub fn transform(&mut self, pose: ObjectToCamera) {
        self.transformed.clear();
        self.transformed.extend(
            self.corners
                .iter()
                .map(|&corner| ViewPoint::projected(pose.transform(corner))),
        );
        self.clipped.clear();
        self.stage = Stage::Transformed;
    }

    /// The corners in the camera frame for the last pose.
    pub fn transformed_corners(&self) -> Result<&[ViewPoint], PolygonError> {
        self.ensure_transformed()?;
        Ok(&self.transformed)
    }

    /// Clips the transformed corners against the configured planes.
    ///
    /// A polygon that lies entirely outside the frustum ends up with an empty boundary.
    /// Side planes require a camera whose field of view was computed.
    pub fn compute_clipped_boundary(
        &mut self,
        camera: &CameraParameters,
    ) -> Result<&[ClippedVertex], PolygonError> {
        self.ensure_transformed()?;
        let frustum = Frustum::new(
            self.settings.planes,
            self.settings.near,
            self.settings.far,
            camera,
        )?;
        self.clipped = clip_boundary(&self.transformed, &frustum);
        self.stage = Stage::Clipped;
        Ok(&self.clipped)
    }

    /// The clipped boundary together with the planes that created each vertex.
    pub fn clipped_boundary(&self) -> Result<&[ClippedVertex], PolygonError> {
        self.ensure_clipped()?;
        Ok(&self.clipped)
    }

    /// The camera frame points of the clipped boundary.
    pub fn clipped_points(&self) -> Result<Vec<CameraPoint>, PolygonError> {
        Ok(self
            .clipped_boundary()?
            .iter()
            .map(|vertex| vertex.point.camera())
            .collect())
    }

    pub(crate) fn ensure_transformed(&self) -> Result<(), PolygonError> {
        match self.stage {
            Stage::Transformed | Stage::Clipped => Ok(()),
            found => Err(PolygonError::Stage {
                expected: Stage::Transformed,
                found,
            }),
        }
    }

    pub(crate) fn ensure_clipped(&self) -> Result<(), PolygonError> {
        match self.stage {
            Stage::Clipped => Ok(()),
            found => Err(PolygonError::Stage {
                expected: Stage::Clipped,
                found,
            }),
        }
    }

    pub(crate) fn transformed(&self) -> &[ViewPoint] {
        &self.transformed
    }

    fn invalidate(&mut self) {
        self.transformed.clear();
        self.clipped.clear();
        self.stage = Stage::Uninitialized;
    }

    fn drop_clipped(&mut self) {
        self.clipped.clear();
        if self.stage == Stage::Clipped {
            self.stage = Stage::Transformed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::nalgebra::{Rotation3, Vector3};

    fn triangle() -> Polygon {
        Polygon::from_corners([
            ObjectPoint::new(0.0, 0.0, 0.0),
            ObjectPoint::new(1.0, 0.0, 0.0),
            ObjectPoint::new(0.0, 1.0, 0.0),
        ])
    }

    fn pose() -> ObjectToCamera {
        ObjectToCamera::from_parts(Vector3::new(0.0, 0.0, 2.0), Rotation3::identity())
    }

    #[test]
    fn defaults() {
        let polygon = Polygon::new();
        assert_eq!(polygon.face_index(), None);
        assert_eq!(polygon.corner_count(), 0);
        assert_eq!(polygon.clip_planes(), ClipPlanes::NONE);
        assert_eq!(polygon.near_clipping_distance(), 0.001);
        assert_eq!(polygon.far_clipping_distance(), 100.0);
        assert!(!polygon.is_visible_flag());
        assert!(!polygon.is_appearing());
        assert_eq!(polygon.corners_inside_prev_count(), 0);
        assert_eq!(polygon.stage(), Stage::Uninitialized);
    }

    #[test]
    fn corner_access_is_bounded() {
        let mut polygon = Polygon::new();
        polygon.set_corner_count(3);
        assert_eq!(polygon.corner(2), Ok(ObjectPoint::default()));
        assert_eq!(
            polygon.corner(3),
            Err(PolygonError::IndexOutOfRange { index: 3, count: 3 })
        );
        assert_eq!(
            polygon.set_corner(3, ObjectPoint::new(1.0, 0.0, 0.0)),
            Err(PolygonError::IndexOutOfRange { index: 3, count: 3 })
        );
        polygon.set_corner(1, ObjectPoint::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(polygon.corner(1), Ok(ObjectPoint::new(1.0, 0.0, 0.0)));
        assert_eq!(polygon.corner_count(), 3);
    }

    #[test]
    fn resizing_clears_state() {
        let mut polygon = triangle();
        polygon.transform(pose());
        polygon.set_corner_count(4);
        assert_eq!(polygon.stage(), Stage::Uninitialized);
        assert!(polygon.corners().iter().all(|&c| c == ObjectPoint::default()));
        assert!(polygon.transformed_corners().is_err());
    }

    #[test]
    fn transform_moves_corners() {
        let mut polygon = triangle();
        polygon.transform(pose());
        let corners = polygon.transformed_corners().unwrap();
        assert_eq!(corners[1].camera(), CameraPoint::new(1.0, 0.0, 2.0));
        assert_eq!(corners[1].projection().unwrap().x, 0.5);
    }

    #[test]
    fn clipping_requires_transform() {
        let camera = CameraParameters::new(cv_pinhole::CameraIntrinsics::identity());
        let mut polygon = triangle();
        assert_eq!(
            polygon.compute_clipped_boundary(&camera).unwrap_err(),
            PolygonError::Stage {
                expected: Stage::Transformed,
                found: Stage::Uninitialized
            }
        );
        polygon.transform(pose());
        assert_eq!(
            polygon.clipped_boundary().unwrap_err(),
            PolygonError::Stage {
                expected: Stage::Clipped,
                found: Stage::Transformed
            }
        );
        polygon.compute_clipped_boundary(&camera).unwrap();
        assert_eq!(polygon.stage(), Stage::Clipped);
        polygon.set_clip_planes(ClipPlanes::NEAR);
        assert_eq!(polygon.stage(), Stage::Transformed);
    }

    #[test]
    fn side_planes_need_fov() {
        let camera = CameraParameters::new(cv_pinhole::CameraIntrinsics::identity());
        let mut polygon = triangle();
        polygon.set_clip_planes(ClipPlanes::LEFT);
        polygon.transform(pose());
        assert_eq!(
            polygon.compute_clipped_boundary(&camera).unwrap_err(),
            PolygonError::FovNotComputed
        );
        assert_eq!(polygon.stage(), Stage::Transformed);
    }

    #[test]
    fn error_messages() {
        let error = PolygonError::Stage {
            expected: Stage::Clipped,
            found: Stage::Uninitialized,
        };
        assert_eq!(
            error.to_string(),
            "polygon must be clipped for this operation, but it is uninitialized"
        );
    }
}
