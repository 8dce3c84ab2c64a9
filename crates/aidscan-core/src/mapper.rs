//! Mapping of bounding boxes from camera-image space into overlay space.
//!
//! The camera delivers frames that are rotated and sized differently from
//! the preview the user looks at. A [`CoordinateMapper`] brings a detector
//! box into the overlay frame so it can be compared against the scanner box.

use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

use crate::Rect;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors raised while building or applying a coordinate transform.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("degenerate geometry (width={width}, height={height})")]
    DegenerateGeometry { width: f32, height: f32 },
    #[error("unsupported rotation of {degrees} degrees (expected a multiple of 90)")]
    UnsupportedRotation { degrees: u32 },
    #[error("transform produced a non-finite coordinate")]
    NonFinite,
    #[error("transform is not invertible")]
    NotInvertible,
}

/// Capability translating rectangles between coordinate spaces.
///
/// Implementations return the axis-aligned bounding box of the mapped
/// input, with ordered edges.
pub trait CoordinateMapper {
    fn map_rect(&self, rect: &Rect) -> Result<Rect, MapError>;
}

impl<M: CoordinateMapper + ?Sized> CoordinateMapper for &M {
    fn map_rect(&self, rect: &Rect) -> Result<Rect, MapError> {
        (**self).map_rect(rect)
    }
}

impl<M: CoordinateMapper + ?Sized> CoordinateMapper for Box<M> {
    fn map_rect(&self, rect: &Rect) -> Result<Rect, MapError> {
        (**self).map_rect(rect)
    }
}

/// Source and destination spaces coincide.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMapper;

impl CoordinateMapper for IdentityMapper {
    fn map_rect(&self, rect: &Rect) -> Result<Rect, MapError> {
        Ok(*rect)
    }
}

/// Mapper backed by a 3x3 homogeneous transform (`dst = m * src`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMapper {
    pub m: Matrix3<f64>,
}

impl AffineMapper {
    pub fn new(m: Matrix3<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Uniform-per-axis scale followed by a translation.
    pub fn from_scale_translation(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self::new(Matrix3::new(
            sx, 0.0, tx, //
            0.0, sy, ty, //
            0.0, 0.0, 1.0,
        ))
    }

    /// Transform applying `self` first and `next` second.
    pub fn then(&self, next: &AffineMapper) -> Self {
        Self::new(next.m * self.m)
    }

    pub fn inverse(&self) -> Result<Self, MapError> {
        self.m
            .try_inverse()
            .map(Self::new)
            .ok_or(MapError::NotInvertible)
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.m * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }
}

impl CoordinateMapper for AffineMapper {
    fn map_rect(&self, rect: &Rect) -> Result<Rect, MapError> {
        let mapped = rect.corners().map(|p| self.apply(p));
        if mapped.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(MapError::NonFinite);
        }
        Rect::bounding(&mapped).ok_or(MapError::NonFinite)
    }
}

/// Clockwise rotation of the camera frame relative to the display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = MapError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees % 360 {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(MapError::UnsupportedRotation { degrees }),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

/// How the rotated camera frame is fitted into the overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Scale until the overlay is covered, cropping the overflow (centered).
    #[default]
    Fill,
    /// Scale until the whole frame is visible, letterboxing (centered).
    Fit,
}

/// Geometry of the analyzed camera image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceGeometry {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: Rotation,
}

/// Geometry of the overlay the scanner box is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetGeometry {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub scale: ScaleMode,
}

fn check_size(width: f32, height: f32) -> Result<(), MapError> {
    let ok = |v: f32| v.is_finite() && v > 0.0;
    if ok(width) && ok(height) {
        Ok(())
    } else {
        Err(MapError::DegenerateGeometry { width, height })
    }
}

/// Mapper derived from the camera source geometry and the overlay geometry.
///
/// The source frame is rotated upright, scaled uniformly to fill or fit the
/// overlay and centered on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMapper {
    transform: AffineMapper,
}

impl ViewportMapper {
    #[cfg_attr(feature = "tracing", instrument(level = "debug"))]
    pub fn new(source: SourceGeometry, target: TargetGeometry) -> Result<Self, MapError> {
        check_size(source.width, source.height)?;
        check_size(target.width, target.height)?;

        let (w, h) = (source.width as f64, source.height as f64);
        let rotate = match source.rotation {
            Rotation::Deg0 => Matrix3::identity(),
            Rotation::Deg90 => Matrix3::new(
                0.0, -1.0, h, //
                1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0,
            ),
            Rotation::Deg180 => Matrix3::new(
                -1.0, 0.0, w, //
                0.0, -1.0, h, //
                0.0, 0.0, 1.0,
            ),
            Rotation::Deg270 => Matrix3::new(
                0.0, 1.0, 0.0, //
                -1.0, 0.0, w, //
                0.0, 0.0, 1.0,
            ),
        };
        let (rw, rh) = if source.rotation.swaps_axes() {
            (h, w)
        } else {
            (w, h)
        };

        let (tw, th) = (target.width as f64, target.height as f64);
        let (sx, sy) = (tw / rw, th / rh);
        let s = match target.scale {
            ScaleMode::Fill => sx.max(sy),
            ScaleMode::Fit => sx.min(sy),
        };
        let place = AffineMapper::from_scale_translation(
            s,
            s,
            (tw - rw * s) / 2.0,
            (th - rh * s) / 2.0,
        );
        let transform = AffineMapper::new(rotate).then(&place);
        log::debug!(
            "viewport mapper: source {}x{} rot {} -> target {}x{} ({:?}), scale {:.4}",
            source.width,
            source.height,
            source.rotation.degrees(),
            target.width,
            target.height,
            target.scale,
            s
        );

        Ok(Self { transform })
    }
}

impl CoordinateMapper for ViewportMapper {
    fn map_rect(&self, rect: &Rect) -> Result<Rect, MapError> {
        self.transform.map_rect(rect)
    }
}
