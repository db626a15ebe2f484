//! Clipping of polygon boundaries against the camera view frustum.
//!
//! The frustum is made of up to six half-spaces: the near and far planes at fixed depths along
//! the optical axis, and the four side planes of the [`FieldOfView`]. The boundary is clipped
//! against one plane at a time, in increasing bit order of [`ClipPlanes`], and each vertex
//! created by a plane is tagged with that plane so callers can tell an edge introduced by the
//! frustum from an edge of the model.

use crate::{PolygonError, ViewPoint};
use cv_core::nalgebra::{Unit, Vector3};
use cv_core::{CameraPoint, ObjectPoint, ObjectToCamera, Pose};
use cv_pinhole::{CameraParameters, FieldOfView};
use log::*;

/// Relative tolerance below which an edge counts as parallel to a clipping plane.
///
/// When the interpolation denominator of a crossing is at most this fraction of the edge
/// length, both endpoints lie within that distance of the plane. The outside endpoint is
/// then moved onto the plane rather than interpolated.
pub const DEGENERATE_EDGE_EPSILON: f64 = 1e-12;

bitflags::bitflags! {
    /// A set of clipping planes.
    ///
    /// The numeric values are stable and may be persisted or compared by callers:
    /// `NEAR = 1`, `FAR = 2`, `LEFT = 4`, `RIGHT = 8`, `UP = 16`, `DOWN = 32`.
    /// Planes are always processed in that order, which decides how origin tags
    /// accumulate on vertices created at the corners of the frustum.
    ///
    /// Any side plane implies the near plane, since side planes are undefined behind
    /// the optical center.
    #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
    pub struct ClipPlanes: u32 {
        const NEAR = 1;
        const FAR = 2;
        const LEFT = 4;
        const RIGHT = 8;
        const UP = 16;
        const DOWN = 32;

        const DEPTH = Self::NEAR.bits() | Self::FAR.bits();
        const FOV = Self::LEFT.bits() | Self::RIGHT.bits() | Self::UP.bits() | Self::DOWN.bits();
        const ALL = Self::DEPTH.bits() | Self::FOV.bits();
    }
}

impl ClipPlanes {
    /// No clipping at all.
    pub const NONE: Self = Self::empty();

    /// The processing order of the individual planes.
    pub const ORDER: [Self; 6] = [
        Self::NEAR,
        Self::FAR,
        Self::LEFT,
        Self::RIGHT,
        Self::UP,
        Self::DOWN,
    ];

    /// Iterates the planes that take part in clipping, in processing order.
    ///
    /// ```
    /// use cv_mbt::ClipPlanes;
    /// let planes: Vec<_> = (ClipPlanes::FAR | ClipPlanes::UP).active().collect();
    /// assert_eq!(planes, [ClipPlanes::NEAR, ClipPlanes::FAR, ClipPlanes::UP]);
    /// ```
    pub fn active(self) -> impl Iterator<Item = ClipPlanes> {
        let implied = if self.intersects(Self::FOV) {
            Self::NEAR
        } else {
            Self::NONE
        };
        let enabled = self | implied;
        Self::ORDER
            .into_iter()
            .filter(move |&plane| enabled.contains(plane))
    }

    /// The side plane normal of `fov` matching a single side plane flag.
    fn fov_normal(self, fov: &FieldOfView) -> Option<&Unit<Vector3<f64>>> {
        if self == Self::LEFT {
            Some(fov.left())
        } else if self == Self::RIGHT {
            Some(fov.right())
        } else if self == Self::UP {
            Some(fov.up())
        } else if self == Self::DOWN {
            Some(fov.down())
        } else {
            None
        }
    }
}

impl Default for ClipPlanes {
    fn default() -> Self {
        Self::NONE
    }
}

/// A vertex of a clipped boundary and the planes which created it.
///
/// Corners of the original polygon have an empty origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedVertex {
    pub point: ViewPoint,
    pub origin: ClipPlanes,
}

impl ClippedVertex {
    pub fn corner(point: ViewPoint) -> Self {
        Self {
            point,
            origin: ClipPlanes::NONE,
        }
    }

    pub fn is_corner(&self) -> bool {
        self.origin.is_empty()
    }
}

/// The clipping parameters of a boundary.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frustum<'a> {
    pub planes: ClipPlanes,
    pub near: f64,
    pub far: f64,
    pub fov: Option<&'a FieldOfView>,
}

impl<'a> Frustum<'a> {
    /// Collects the frustum of `camera`, failing if side planes are requested
    /// without a computed field of view.
    pub fn new(
        planes: ClipPlanes,
        near: f64,
        far: f64,
        camera: &'a CameraParameters,
    ) -> Result<Self, PolygonError> {
        let fov = if planes.intersects(ClipPlanes::FOV) {
            Some(camera.fov().ok_or(PolygonError::FovNotComputed)?)
        } else {
            None
        };
        Ok(Self {
            planes,
            near,
            far,
            fov,
        })
    }

    /// The half-space of a single plane flag.
    fn boundary(&self, plane: ClipPlanes) -> Option<Boundary<'a>> {
        if plane == ClipPlanes::NEAR {
            Some(Boundary::Near(self.near))
        } else if plane == ClipPlanes::FAR {
            Some(Boundary::Far(self.far))
        } else {
            self.fov
                .and_then(|fov| plane.fov_normal(fov))
                .map(Boundary::Side)
        }
    }
}

/// The visible half-space of one clipping plane.
#[derive(Debug, Clone, Copy)]
enum Boundary<'a> {
    /// Points at least this deep are visible.
    Near(f64),
    /// Points at most this deep are visible.
    Far(f64),
    /// A side plane through the optical center, with its inward normal.
    Side(&'a Unit<Vector3<f64>>),
}

impl Boundary<'_> {
    fn contains(self, point: CameraPoint) -> bool {
        match self {
            Boundary::Near(near) => point.z >= near,
            Boundary::Far(far) => point.z <= far,
            Boundary::Side(normal) => in_front_of(point, normal),
        }
    }

    /// The point where segment `a`-`b` meets the plane.
    ///
    /// Returns `None` when the segment is parallel to the plane within
    /// [`DEGENERATE_EDGE_EPSILON`].
    fn crossing(self, a: CameraPoint, b: CameraPoint) -> Option<CameraPoint> {
        let delta = b.0 - a.0;
        let threshold = DEGENERATE_EDGE_EPSILON * delta.norm();
        match self {
            Boundary::Near(depth) | Boundary::Far(depth) => {
                if delta.z.abs() <= threshold {
                    return None;
                }
                let t = (depth - a.z) / delta.z;
                Some(CameraPoint::new(
                    a.x + delta.x * t,
                    a.y + delta.y * t,
                    depth,
                ))
            }
            Boundary::Side(normal) => {
                let denominator = normal.dot(&delta);
                if denominator.abs() <= threshold {
                    return None;
                }
                let t = -normal.dot(&a.coords) / denominator;
                Some(CameraPoint(a.0 + delta * t))
            }
        }
    }

    /// The orthogonal projection of `point` onto the plane.
    fn snap(self, point: CameraPoint) -> CameraPoint {
        match self {
            Boundary::Near(depth) | Boundary::Far(depth) => {
                CameraPoint::new(point.x, point.y, depth)
            }
            Boundary::Side(normal) => {
                CameraPoint(point.0 - normal.scale(normal.dot(&point.coords)))
            }
        }
    }
}

/// How one edge relates to one plane.
enum EdgeClip {
    Outside,
    Inside,
    /// The first endpoint was outside and is replaced by this vertex.
    Entering(ClippedVertex),
    /// The second endpoint was outside and is replaced by this vertex.
    Leaving(ClippedVertex),
}

/// Clips a boundary against every active plane of the frustum.
///
/// `corners` are the camera frame corners of the polygon. A two corner boundary is
/// treated as a line segment with no closing edge.
pub(crate) fn clip_boundary(corners: &[ViewPoint], frustum: &Frustum) -> Vec<ClippedVertex> {
    let mut working: Vec<ClippedVertex> =
        corners.iter().copied().map(ClippedVertex::corner).collect();
    let is_line = corners.len() == 2;

    for plane in frustum.planes.active() {
        let Some(boundary) = frustum.boundary(plane) else {
            continue;
        };
        let before = working.len();
        working = clip_against(&working, plane, boundary, is_line);
        trace!(
            "clipping against {:?} turned {} vertices into {}",
            plane,
            before,
            working.len()
        );
    }

    if working.is_empty() && !corners.is_empty() {
        debug!("polygon with {} corners was clipped away", corners.len());
    }
    working
}

/// Runs a single plane over the closed cycle of edges of `working`.
fn clip_against(
    working: &[ClippedVertex],
    plane: ClipPlanes,
    boundary: Boundary,
    is_line: bool,
) -> Vec<ClippedVertex> {
    let len = working.len();
    let mut output = Vec::with_capacity(len + 2);
    for j in 0..len {
        let first = working[j];
        let second = working[(j + 1) % len];
        match clip_edge(first, second, plane, boundary) {
            EdgeClip::Outside => {}
            EdgeClip::Inside => {
                output.push(first);
                if is_line {
                    output.push(second);
                }
            }
            EdgeClip::Entering(vertex) => {
                output.push(vertex);
                if is_line {
                    output.push(second);
                }
            }
            EdgeClip::Leaving(vertex) => {
                output.push(first);
                output.push(vertex);
            }
        }
        // A line has no closing edge.
        if is_line {
            break;
        }
    }
    output
}

fn clip_edge(
    first: ClippedVertex,
    second: ClippedVertex,
    plane: ClipPlanes,
    boundary: Boundary,
) -> EdgeClip {
    let a = first.point.camera();
    let b = second.point.camera();

    match (boundary.contains(a), boundary.contains(b)) {
        (true, true) => EdgeClip::Inside,
        (false, false) => EdgeClip::Outside,
        (first_inside, _) => {
            let outside = if first_inside { b } else { a };
            let point = boundary.crossing(a, b).unwrap_or_else(|| {
                debug!(
                    "edge {:?} -> {:?} runs along {:?}, snapping {:?} onto it",
                    a, b, plane, outside
                );
                boundary.snap(outside)
            });
            let point = ViewPoint::projected(point);
            if first_inside {
                EdgeClip::Leaving(ClippedVertex {
                    point,
                    origin: second.origin | plane,
                })
            } else {
                EdgeClip::Entering(ClippedVertex {
                    point,
                    origin: first.origin | plane,
                })
            }
        }
    }
}

/// Checks if the direction of `point` makes an angle below a right angle with `normal`.
fn in_front_of(point: CameraPoint, normal: &Unit<Vector3<f64>>) -> bool {
    normal.dot(&point.coords.normalize()) > 0.0
}

/// Clips an arbitrary set of object points without keeping a [`Polygon`](crate::Polygon) around.
///
/// The points are moved into the camera frame with `pose` and clipped against `planes`.
/// `near` only applies when `planes` contains [`ClipPlanes::NEAR`] and `far` only when it
/// contains [`ClipPlanes::FAR`]; the default distances are used otherwise.
///
/// ```
/// use cv_core::{ObjectPoint, ObjectToCamera, Pose};
/// use cv_core::nalgebra::{Point2, Rotation3, Vector3};
/// use cv_mbt::{clipped_polygon, ClipPlanes};
/// use cv_pinhole::{CameraIntrinsics, CameraParameters};
///
/// let camera = CameraParameters::new(
///     CameraIntrinsics::identity().focal(600.0).principal_point(Point2::new(320.0, 240.0)),
/// );
/// let pose = ObjectToCamera::from_parts(Vector3::new(0.0, 0.0, 1.0), Rotation3::identity());
/// let line = [ObjectPoint::new(0.0, 0.0, -2.0), ObjectPoint::new(0.0, 0.0, 1.0)];
/// let clipped = clipped_polygon(&line, pose, ClipPlanes::NEAR, &camera, 0.5, 10.0).unwrap();
/// assert_eq!(clipped.len(), 2);
/// assert_eq!(clipped[0].z, 0.5);
/// ```
pub fn clipped_polygon(
    points: &[ObjectPoint],
    pose: ObjectToCamera,
    planes: ClipPlanes,
    camera: &CameraParameters,
    near: f64,
    far: f64,
) -> Result<Vec<CameraPoint>, PolygonError> {
    let defaults = crate::ClipSettings::default();
    let near = if planes.contains(ClipPlanes::NEAR) {
        near
    } else {
        defaults.near
    };
    let far = if planes.contains(ClipPlanes::FAR) {
        far
    } else {
        defaults.far
    };
    let frustum = Frustum::new(planes, near, far, camera)?;
    let corners: Vec<ViewPoint> = points
        .iter()
        .map(|&point| ViewPoint::projected(pose.transform(point)))
        .collect();
    Ok(clip_boundary(&corners, &frustum)
        .into_iter()
        .map(|vertex| vertex.point.camera())
        .collect())
}
