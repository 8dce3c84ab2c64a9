//! Geometry shared by the scan stabilization engine.
//!
//! This crate knows nothing about barcodes. It provides the [`Rect`] type,
//! the containment and fill predicates of the scanner box, and the
//! [`CoordinateMapper`] capability that moves detector boxes from camera
//! space into overlay space.

pub mod mapper;
mod rect;
pub mod validator;

pub use mapper::{
    AffineMapper, CoordinateMapper, IdentityMapper, MapError, Rotation, ScaleMode,
    SourceGeometry, TargetGeometry, ViewportMapper,
};
pub use rect::Rect;
pub use validator::{fill_percent, is_inside, is_large_enough, MIN_FILL_PERCENT};
