use cv_core::CameraPoint;
use cv_pinhole::NormalizedKeyPoint;

/// A polygon vertex expressed in the camera frame.
///
/// The normalized image projection `(X / Z, Y / Z)` is only available after
/// [`ViewPoint::project`] ran, and never for points lying in the plane of the
/// optical center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewPoint {
    camera: CameraPoint,
    projection: Option<NormalizedKeyPoint>,
}

impl ViewPoint {
    /// Creates an unprojected point.
    pub fn new(camera: CameraPoint) -> Self {
        Self {
            camera,
            projection: None,
        }
    }

    /// Creates a point and immediately computes its projection.
    pub fn projected(camera: CameraPoint) -> Self {
        let mut point = Self::new(camera);
        point.project();
        point
    }

    /// Recomputes the normalized projection from the camera coordinates.
    pub fn project(&mut self) -> Option<NormalizedKeyPoint> {
        self.projection = NormalizedKeyPoint::from_camera_point(self.camera);
        self.projection
    }

    pub fn camera(&self) -> CameraPoint {
        self.camera
    }

    pub fn projection(&self) -> Option<NormalizedKeyPoint> {
        self.projection
    }

    pub fn depth(&self) -> f64 {
        self.camera.depth()
    }
}

impl From<ViewPoint> for CameraPoint {
    fn from(point: ViewPoint) -> Self {
        point.camera
    }
}
