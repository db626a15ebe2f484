//! # Rust CV Core
//!
//! This library provides the common abstractions shared by the model-based tracking crates
//! in this workspace: points expressed in the object and camera frames, the rigid poses that
//! move points between those frames, pixel keypoints, and the camera model trait that converts
//! between pixels and normalized image coordinates.
//!
//! The crate is designed to work with `#![no_std]`, even without an allocator. `libm` is used
//! (through `nalgebra`) for all math algorithms that aren't present in `core`.
//!
//! ## Frames
//!
//! A tracked object is described by a CAD model whose corners live in the *object frame*.
//! At every video frame the tracker has an estimate of the [`ObjectToCamera`] pose, which maps
//! [`ObjectPoint`] into [`CameraPoint`]. From there a camera model maps the point onto the
//! virtual image plane and finally onto the pixel grid.
//!
//! - `o` a corner of the object model
//! - `O` the optical center of the camera
//! - `@` the virtual image plane at depth `1.0`
//!
//! ```text
//!                 @
//!        o--------x--------O
//!                 @
//!                 @
//! ```

#![no_std]

mod camera;
mod keypoint;
mod point;
mod pose;

pub use camera::*;
pub use keypoint::*;
pub use nalgebra;
pub use point::*;
pub use pose::*;
