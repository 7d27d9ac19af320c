//! Adaptive triangular mesh over a possibly discontinuous mapping.
//!
//! An [`AdaptiveMesh`] starts from a Delaunay triangulation of the initial
//! domain points and maps every point to image space once. Triangles that are
//! too large, cut by a discontinuity, or touch undefined image points are then
//! refined in place:
//!
//! - [`AdaptiveMesh::refine_large_triangles`] inserts centroids and keeps the
//!   mesh Delaunay (legal only while [`AdaptiveMesh::is_delaunay`] holds);
//! - [`AdaptiveMesh::refine_broken_triangles`] resamples the cut edges and
//!   splits each broken triangle in five;
//! - [`AdaptiveMesh::refine_invalid_triangles`] cuts away the part of a
//!   triangle next to its undefined vertices.
//!
//! The last two give up the Delaunay property for good but conserve domain
//! area exactly (broken) or never add area (invalid).
//!
//! # Expected invariants
//! - `domain_points` and `image_points` have equal length and only grow;
//!   an image point is never recomputed.
//! - Every simplex references existing points and has strictly positive
//!   signed area in domain space.
//! - Coincident points are allowed once the mesh is no longer Delaunay.
//!
//! # Example
//! ```rust
//! use flux_mesh::geometry::point::Point2;
//! use flux_mesh::mesh::AdaptiveMesh;
//!
//! let square = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let identity = |pts: &[Point2]| pts.to_vec();
//! let mesh = AdaptiveMesh::new(&square, identity)?;
//! assert_eq!(mesh.simplices().len(), 2);
//! assert!((mesh.initial_domain_area() - 1.0).abs() < 1e-12);
//! # Ok::<(), flux_mesh::mesh_error::MeshError>(())
//! ```

pub mod classify;
mod merge;
mod refine;
mod resample;
pub mod snapshot;

use crate::debug_invariants::DebugInvariants;
use crate::geometry::delaunay::{BowyerWatson, IncrementalTriangulation};
use crate::geometry::point::{Point2, points_from_flat};
use crate::geometry::predicates::signed_area;
use crate::mapping::{Mapping, map_checked};
use crate::mesh_error::MeshError;

/// Relative area below which a new triangle counts as degenerate, and the
/// relative tolerance of the area-conservation check.
pub const AREA_TOLERANCE: f64 = 1e-10;

/// Signed areas of `simplices` over `points`.
///
/// # Panics
/// If a simplex references an index outside `points`.
pub fn signed_areas(points: &[Point2], simplices: &[[usize; 3]]) -> Vec<f64> {
    simplices
        .iter()
        .map(|&[a, b, c]| signed_area(&points[a], &points[b], &points[c]))
        .collect()
}

/// Read-only view of a mesh: points in both spaces plus the triangle list.
///
/// This is what classification predicates and detectors receive.
#[derive(Clone, Copy, Debug)]
pub struct MeshView<'a> {
    pub domain: &'a [Point2],
    pub image: &'a [Point2],
    pub simplices: &'a [[usize; 3]],
}

impl<'a> MeshView<'a> {
    /// Signed domain-space area of each of `simplices` (positive for CCW).
    pub fn area_in_domain(&self, simplices: &[[usize; 3]]) -> Vec<f64> {
        signed_areas(self.domain, simplices)
    }

    /// Signed image-space area of each of `simplices`. A negative sign means
    /// the mapping flips orientation locally; NaN means an undefined vertex.
    pub fn area_in_image(&self, simplices: &[[usize; 3]]) -> Vec<f64> {
        signed_areas(self.image, simplices)
    }

    /// Sum of unsigned domain areas over all simplices of the view.
    pub fn total_domain_area(&self) -> f64 {
        self.area_in_domain(self.simplices)
            .iter()
            .map(|a| a.abs())
            .sum()
    }

    #[inline]
    pub fn domain_triangle(&self, simplex: [usize; 3]) -> [Point2; 3] {
        simplex.map(|v| self.domain[v])
    }

    #[inline]
    pub fn image_triangle(&self, simplex: [usize; 3]) -> [Point2; 3] {
        simplex.map(|v| self.image[v])
    }

    /// True if any vertex of `simplex` has an undefined image.
    #[inline]
    pub fn has_undefined_vertex(&self, simplex: [usize; 3]) -> bool {
        simplex.iter().any(|&v| !self.image[v].is_defined())
    }
}

/// Adaptive mesh for a mapping `M`, backed by the Delaunay structure `T`
/// until the first non-Delaunay refinement.
#[derive(Clone)]
pub struct AdaptiveMesh<M, T = BowyerWatson> {
    mapping: M,
    /// `Some` while the triangle list is the Delaunay structure's own.
    triangulation: Option<T>,
    initial_len: usize,
    domain: Vec<Point2>,
    image: Vec<Point2>,
    simplices: Vec<[usize; 3]>,
    initial_domain_area: f64,
}

impl<M, T: std::fmt::Debug> std::fmt::Debug for AdaptiveMesh<M, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveMesh")
            .field("triangulation", &self.triangulation)
            .field("initial_len", &self.initial_len)
            .field("domain", &self.domain)
            .field("image", &self.image)
            .field("simplices", &self.simplices)
            .field("initial_domain_area", &self.initial_domain_area)
            .finish_non_exhaustive()
    }
}

impl<M: Mapping> AdaptiveMesh<M, BowyerWatson> {
    /// Triangulate `initial_domain` and map it through `mapping`.
    pub fn new(initial_domain: &[Point2], mapping: M) -> Result<Self, MeshError> {
        Self::with_triangulation(initial_domain, mapping)
    }

    /// Like [`AdaptiveMesh::new`], from a flat `[x0, y0, x1, y1, ...]` buffer.
    pub fn from_flat(initial_domain: &[f64], mapping: M) -> Result<Self, MeshError> {
        Self::new(points_from_flat(initial_domain)?, mapping)
    }
}

impl<M: Mapping, T: IncrementalTriangulation> AdaptiveMesh<M, T> {
    /// Build the mesh with an explicit Delaunay implementation.
    ///
    /// Fails with a configuration error if fewer than three points are given,
    /// a point is not finite, the points span no triangle, or the mapping
    /// returns the wrong number of image points. Coincident points on the
    /// boundary of the point set are not supported.
    pub fn with_triangulation(initial_domain: &[Point2], mapping: M) -> Result<Self, MeshError> {
        if initial_domain.len() < 3 {
            return Err(MeshError::TooFewPoints(initial_domain.len()));
        }
        if let Some(index) = initial_domain.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFiniteDomainPoint { index });
        }
        let triangulation = T::triangulate(initial_domain)?;
        let simplices = triangulation.simplices();
        let image = map_checked(&mapping, initial_domain)?;

        let initial_domain_area: f64 = signed_areas(initial_domain, &simplices)
            .iter()
            .map(|a| a.abs())
            .sum();
        if !(initial_domain_area > 0.0) {
            return Err(MeshError::DegenerateTriangulation);
        }

        let mesh = Self {
            mapping,
            triangulation: Some(triangulation),
            initial_len: initial_domain.len(),
            domain: initial_domain.to_vec(),
            image,
            simplices,
            initial_domain_area,
        };
        crate::debug_invariants!(mesh.validate_invariants(), "AdaptiveMesh::new");
        Ok(mesh)
    }
}

impl<M, T> AdaptiveMesh<M, T> {
    /// All domain points, initial ones first, in creation order.
    #[inline]
    pub fn domain_points(&self) -> &[Point2] {
        &self.domain
    }

    /// Image of each domain point; may contain [`Point2::UNDEFINED`].
    #[inline]
    pub fn image_points(&self) -> &[Point2] {
        &self.image
    }

    #[inline]
    pub fn simplices(&self) -> &[[usize; 3]] {
        &self.simplices
    }

    /// Domain points supplied at construction.
    #[inline]
    pub fn initial_domain(&self) -> &[Point2] {
        &self.domain[..self.initial_len]
    }

    /// Images of the points supplied at construction.
    #[inline]
    pub fn initial_image(&self) -> &[Point2] {
        &self.image[..self.initial_len]
    }

    /// Unsigned domain area of the initial triangulation.
    #[inline]
    pub fn initial_domain_area(&self) -> f64 {
        self.initial_domain_area
    }

    /// True until the first broken- or invalid-triangle refinement.
    #[inline]
    pub fn is_delaunay(&self) -> bool {
        self.triangulation.is_some()
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.domain.len()
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.simplices.len()
    }

    #[inline]
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Borrow the mesh as `(domain, image, simplices)`.
    #[inline]
    pub fn view(&self) -> MeshView<'_> {
        MeshView {
            domain: &self.domain,
            image: &self.image,
            simplices: &self.simplices,
        }
    }

    /// Signed domain-space area of each of `simplices`.
    pub fn area_in_domain(&self, simplices: &[[usize; 3]]) -> Vec<f64> {
        self.view().area_in_domain(simplices)
    }

    /// Signed image-space area of each of `simplices`; the sign is reported as-is.
    pub fn area_in_image(&self, simplices: &[[usize; 3]]) -> Vec<f64> {
        self.view().area_in_image(simplices)
    }
}

impl<M, T> DebugInvariants for AdaptiveMesh<M, T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "AdaptiveMesh");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        if self.domain.len() != self.image.len() {
            return Err(MeshError::PointCountMismatch {
                domain: self.domain.len(),
                image: self.image.len(),
            });
        }
        let len = self.domain.len();
        for (simplex, t) in self.simplices.iter().enumerate() {
            if let Some(&index) = t.iter().find(|&&v| v >= len) {
                return Err(MeshError::SimplexIndexOutOfBounds {
                    simplex,
                    index,
                    len,
                });
            }
        }
        for (triangle, area) in self.area_in_domain(&self.simplices).into_iter().enumerate() {
            if !(area > 0.0) {
                return Err(MeshError::NonPositiveArea { triangle, area });
            }
        }
        Ok(())
    }
}
