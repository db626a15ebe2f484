//! Polygon visibility and view frustum clipping for model-based tracking.
//!
//! A model-based tracker describes the tracked object with the faces and lines of its CAD
//! model. For every video frame, with the current estimate of the [`ObjectToCamera`] pose,
//! each [`Polygon`] of the model goes through the same steps:
//!
//! 1. [`Polygon::transform`] moves its corners into the camera frame.
//! 2. [`Polygon::is_visible`] decides whether the face looks towards the camera, and whether
//!    it is about to (the appearing state), so the tracker can activate faces without flicker.
//! 3. [`Polygon::compute_clipped_boundary`] clips the boundary against the near and far
//!    planes and the four sides of the [`FieldOfView`](cv_pinhole::FieldOfView), tagging every
//!    vertex introduced by a plane with [`ClipPlanes`].
//! 4. [`Polygon::clipped_image_roi`] and friends turn the result into pixel regions which
//!    feed rendering and measurement.
//!
//! The steps are ordered: the polygon tracks its [`Stage`] and refuses to hand out results
//! computed for a previous pose.
//!
//! [`ObjectToCamera`]: cv_core::ObjectToCamera

mod clip;
mod error;
mod point;
mod polygon;
mod roi;
mod settings;
mod visibility;

pub use clip::{clipped_polygon, ClipPlanes, ClippedVertex, DEGENERATE_EDGE_EPSILON};
pub use error::*;
pub use point::*;
pub use polygon::*;
pub use roi::*;
pub use settings::*;
pub use visibility::*;
