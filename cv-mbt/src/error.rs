use crate::Stage;
use thiserror::Error;

/// Errors returned by [`Polygon`](crate::Polygon) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolygonError {
    #[error("corner index {index} is out of range for a polygon with {count} corners")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("polygon must be {expected} for this operation, but it is {found}")]
    Stage { expected: Stage, found: Stage },
    #[error("field of view clipping requested but the camera field of view was not computed")]
    FovNotComputed,
}
