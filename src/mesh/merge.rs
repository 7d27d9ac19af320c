//! Replacement of triangles by their subdivisions.
//!
//! Every non-Delaunay refinement ends here. New points and triangles are
//! staged in a [`Subdivision`] and only committed once the checks pass, so a
//! failing call leaves the mesh exactly as it was:
//!
//! 1. new triangles with `|area| < AREA_TOLERANCE * initial_domain_area` are
//!    dropped as degenerate;
//! 2. every surviving new triangle must be counter-clockwise;
//! 3. the unsigned area of the new triangles must match the replaced ones
//!    ([`AreaPolicy::Conserve`]) or not exceed them ([`AreaPolicy::NoGrowth`]);
//! 4. the triangle list becomes untouched triangles followed by survivors,
//!    and the mesh stops being Delaunay.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::point::Point2;
use crate::geometry::predicates::signed_area;
use crate::mesh::{AREA_TOLERANCE, AdaptiveMesh};
use crate::mesh_error::MeshError;

/// Area check applied when committing a subdivision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AreaPolicy {
    /// New triangles tile the replaced ones exactly.
    Conserve,
    /// New triangles cover part of the replaced ones (undefined regions cut away).
    NoGrowth,
}

/// Points and triangles staged for a single refinement call.
#[derive(Clone, Debug, Default)]
pub(crate) struct Subdivision {
    /// Index of the first staged point (the mesh's point count when staging began).
    pub base: usize,
    pub domain: Vec<Point2>,
    pub image: Vec<Point2>,
    pub simplices: Vec<[usize; 3]>,
}

impl Subdivision {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Stage a point and return its future mesh index.
    pub fn push_point(&mut self, domain: Point2, image: Point2) -> usize {
        self.domain.push(domain);
        self.image.push(image);
        self.base + self.domain.len() - 1
    }
}

impl<M, T> AdaptiveMesh<M, T> {
    /// Domain coordinates of `index`, looking through staged points.
    fn staged_domain(&self, staged: &Subdivision, index: usize) -> Point2 {
        if index < staged.base {
            self.domain[index]
        } else {
            staged.domain[index - staged.base]
        }
    }

    /// Signed domain area of a triangle that may use staged points.
    pub(crate) fn staged_area(&self, staged: &Subdivision, t: [usize; 3]) -> f64 {
        let [a, b, c] = t.map(|v| self.staged_domain(staged, v));
        signed_area(&a, &b, &c)
    }

    /// Check and commit `staged`, replacing the triangles flagged in `replace`.
    ///
    /// Returns the number of triangles added.
    pub(crate) fn merge_subdivision(
        &mut self,
        staged: Subdivision,
        replace: &[bool],
        policy: AreaPolicy,
    ) -> Result<usize, MeshError> {
        if replace.len() != self.simplices.len() {
            return Err(MeshError::MaskLengthMismatch {
                expected: self.simplices.len(),
                found: replace.len(),
            });
        }

        let areas: Vec<f64> = staged
            .simplices
            .iter()
            .map(|&t| self.staged_area(&staged, t))
            .collect();
        let degenerate_limit = AREA_TOLERANCE * self.initial_domain_area;

        let mut survivors = Vec::with_capacity(staged.simplices.len());
        for (i, (&t, &area)) in staged.simplices.iter().zip(&areas).enumerate() {
            if area.abs() < degenerate_limit {
                continue;
            }
            if !(area > 0.0) {
                return Err(MeshError::NonPositiveArea { triangle: i, area });
            }
            survivors.push(t);
        }
        let dropped = staged.simplices.len() - survivors.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} degenerate triangles");
        }

        let replaced: Vec<[usize; 3]> = self
            .simplices
            .iter()
            .zip(replace)
            .filter_map(|(&t, &r)| r.then_some(t))
            .collect();
        let old: f64 = self.area_in_domain(&replaced).iter().map(|a| a.abs()).sum();
        let new: f64 = areas.iter().map(|a| a.abs()).sum();
        let tolerance = AREA_TOLERANCE * old;
        let violated = match policy {
            AreaPolicy::Conserve => !((old - new).abs() <= tolerance),
            AreaPolicy::NoGrowth => !(new - old <= tolerance),
        };
        if violated {
            return Err(MeshError::AreaNotConserved { old, new });
        }

        self.domain.extend(staged.domain);
        self.image.extend(staged.image);
        let mut simplices: Vec<[usize; 3]> = self
            .simplices
            .iter()
            .zip(replace)
            .filter_map(|(&t, &r)| (!r).then_some(t))
            .collect();
        let added = survivors.len();
        simplices.extend(survivors);
        self.simplices = simplices;
        self.triangulation = None;

        crate::debug_invariants!(self.validate_invariants(), "merge_subdivision");
        Ok(added)
    }
}
