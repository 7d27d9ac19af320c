//! Planar points with an explicit "undefined" sentinel.
//!
//! Both domain and image coordinates are stored as [`Point2`]. A mapping that
//! cannot produce an image for a domain point (blocked ray, failed trace)
//! returns [`Point2::UNDEFINED`]; any point with a NaN coordinate is treated as
//! undefined.
//!
//! `Point2` is `#[repr(C)]` and [`bytemuck::Pod`], so flat N×2 `f64` buffers
//! convert to and from point slices without copying:
//!
//! ```rust
//! use flux_mesh::geometry::point::{points_as_flat, points_from_flat, Point2};
//!
//! let flat = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
//! let points = points_from_flat(&flat)?;
//! assert_eq!(points[1], Point2::new(1.0, 0.0));
//! assert_eq!(points_as_flat(points), &flat);
//! # Ok::<(), flux_mesh::mesh_error::MeshError>(())
//! ```

use crate::mesh_error::MeshError;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use static_assertions::{assert_impl_all, const_assert_eq};

/// A point in domain or image space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

const_assert_eq!(std::mem::size_of::<Point2>(), 2 * std::mem::size_of::<f64>());
assert_impl_all!(Point2: Send, Sync, Copy);

impl Point2 {
    /// Sentinel returned by a mapping that could not produce an image point.
    pub const UNDEFINED: Point2 = Point2 {
        x: f64::NAN,
        y: f64::NAN,
    };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// False if either coordinate is NaN.
    #[inline]
    pub fn is_defined(&self) -> bool {
        !(self.x.is_nan() || self.y.is_nan())
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean distance.
    #[inline]
    pub fn dist_sq(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// `(1 - t) * self + t * other`; exact at `t = 0` and `t = 1`.
    #[inline]
    pub fn lerp(&self, other: &Point2, t: f64) -> Point2 {
        Point2::new(
            (1.0 - t) * self.x + t * other.x,
            (1.0 - t) * self.y + t * other.y,
        )
    }

    /// Centre of gravity of a triangle.
    #[inline]
    pub fn centroid(a: &Point2, b: &Point2, c: &Point2) -> Point2 {
        Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Point2::new(x, y)
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

/// Image-space separation of two samples used to locate discontinuities.
///
/// Squared distance when both points are defined, `0` when both are undefined
/// (nothing to resolve between them) and `+inf` when exactly one is undefined.
#[inline]
pub fn sample_gap(a: &Point2, b: &Point2) -> f64 {
    match (a.is_defined(), b.is_defined()) {
        (true, true) => a.dist_sq(b),
        (false, false) => 0.0,
        _ => f64::INFINITY,
    }
}

/// View a flat `[x0, y0, x1, y1, ...]` buffer as points.
pub fn points_from_flat(flat: &[f64]) -> Result<&[Point2], MeshError> {
    bytemuck::try_cast_slice(flat).map_err(|_| MeshError::OddCoordinateBuffer(flat.len()))
}

/// View points as a flat `[x0, y0, x1, y1, ...]` buffer.
pub fn points_as_flat(points: &[Point2]) -> &[f64] {
    bytemuck::cast_slice(points)
}
