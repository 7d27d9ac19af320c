//! The mapping `f: domain -> image` sampled by the adaptive mesh.
//!
//! A mapping receives a batch of domain points and must return exactly one
//! image point per input, in order. Points it cannot map are returned as
//! [`Point2::UNDEFINED`]. The mesh treats the mapping as pure: it is evaluated
//! once per new point and never asked for the same point twice.
//!
//! Any `Fn(&[Point2]) -> Vec<Point2>` is a mapping, so parameters are bound by
//! capturing them:
//!
//! ```rust
//! use flux_mesh::geometry::point::Point2;
//! use flux_mesh::mapping::Mapping;
//!
//! let magnification = 2.0;
//! let scale = |pts: &[Point2]| -> Vec<Point2> {
//!     pts.iter().map(|p| Point2::new(magnification * p.x, magnification * p.y)).collect()
//! };
//! assert_eq!(scale.map(&[Point2::new(1.0, 0.5)]), vec![Point2::new(2.0, 1.0)]);
//! ```

use crate::geometry::point::Point2;
use crate::mesh_error::MeshError;

/// Batch evaluation of a domain-to-image mapping.
pub trait Mapping {
    /// Map `domain` to image space; the result must have the same length.
    fn map(&self, domain: &[Point2]) -> Vec<Point2>;
}

impl<F> Mapping for F
where
    F: Fn(&[Point2]) -> Vec<Point2>,
{
    #[inline]
    fn map(&self, domain: &[Point2]) -> Vec<Point2> {
        self(domain)
    }
}

/// Evaluate `mapping` and check that it returned one image point per input.
pub(crate) fn map_checked<M: Mapping + ?Sized>(
    mapping: &M,
    domain: &[Point2],
) -> Result<Vec<Point2>, MeshError> {
    if domain.is_empty() {
        return Ok(Vec::new());
    }
    let image = mapping.map(domain);
    if image.len() != domain.len() {
        return Err(MeshError::MappingShapeMismatch {
            expected: domain.len(),
            found: image.len(),
        });
    }
    Ok(image)
}
