//! Refinement operations on [`AdaptiveMesh`].
//!
//! # Expected invariants
//! - Refinement only appends points; existing indices stay valid.
//! - `refine_large_triangles` keeps the mesh Delaunay and is rejected with
//!   [`MeshError::IllegalState`] once the mesh stopped being Delaunay.
//! - `refine_broken_triangles` replaces each broken triangle by five that tile
//!   it exactly; `refine_invalid_triangles` replaces a triangle by a part of it.
//! - A call that returns an error leaves the mesh unchanged.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::delaunay::IncrementalTriangulation;
use crate::geometry::point::Point2;
use crate::mapping::{Mapping, map_checked};
use crate::mesh::merge::{AreaPolicy, Subdivision};
use crate::mesh::resample::{
    Corners, EdgeSamples, Side, first_defined, last_defined_from_start, widest_segment,
};
use crate::mesh::{AREA_TOLERANCE, AdaptiveMesh, MeshView};
use crate::mesh_error::MeshError;

fn check_mask(mask: &[bool], expected: usize) -> Result<(), MeshError> {
    if mask.len() != expected {
        return Err(MeshError::MaskLengthMismatch {
            expected,
            found: mask.len(),
        });
    }
    Ok(())
}

/// The five pieces of a split triangle must cover its unsigned area to
/// within `AREA_TOLERANCE` relative.
fn check_partition(triangle: usize, expected: f64, found: f64) -> Result<(), MeshError> {
    if !((expected - found).abs() <= AREA_TOLERANCE * expected) {
        return Err(MeshError::PartitionMismatch {
            triangle,
            expected,
            found,
        });
    }
    Ok(())
}

/// Stage sample `i` of triangle `k`'s edge `side`.
fn stage_sample(
    staged: &mut Subdivision,
    samples: &EdgeSamples,
    k: usize,
    side: Side,
    i: usize,
) -> usize {
    staged.push_point(samples.domain(k, side)[i], samples.image(k, side)[i])
}

impl<M: Mapping, T: IncrementalTriangulation> AdaptiveMesh<M, T> {
    /// Insert the domain centroid of every triangle flagged by `is_large`
    /// and restore the Delaunay triangulation.
    ///
    /// Returns the number of points added; zero means nothing was flagged.
    /// Fails with [`MeshError::IllegalState`] after any broken- or
    /// invalid-triangle refinement.
    pub fn refine_large_triangles<F>(&mut self, is_large: F) -> Result<usize, MeshError>
    where
        F: FnOnce(&MeshView<'_>) -> Vec<bool>,
    {
        if self.triangulation.is_none() {
            return Err(MeshError::IllegalState(
                "large-triangle refinement requires a Delaunay mesh",
            ));
        }
        let mask = is_large(&self.view());
        check_mask(&mask, self.simplices.len())?;

        let centroids: Vec<Point2> = self
            .simplices
            .iter()
            .zip(&mask)
            .filter(|&(_, &large)| large)
            .map(|(&[a, b, c], _)| {
                Point2::centroid(&self.domain[a], &self.domain[b], &self.domain[c])
            })
            .filter(Point2::is_finite)
            .collect();
        if centroids.is_empty() {
            return Ok(0);
        }

        let image = map_checked(&self.mapping, &centroids)?;
        let Some(triangulation) = self.triangulation.as_mut() else {
            return Err(MeshError::IllegalState(
                "large-triangle refinement requires a Delaunay mesh",
            ));
        };
        triangulation.insert(&centroids)?;
        self.simplices = triangulation.simplices();
        self.domain.extend_from_slice(&centroids);
        self.image.extend(image);

        log::info!("large-triangle refinement added {} points", centroids.len());
        crate::debug_invariants!(self.validate_invariants(), "refine_large_triangles");
        Ok(centroids.len())
    }
}

impl<M: Mapping, T> AdaptiveMesh<M, T> {
    /// Split every triangle flagged by `is_broken` in five along the
    /// discontinuity located by resampling its two longest image edges with
    /// `n_divide` points each.
    ///
    /// Triangles whose three vertices are undefined are left alone. Returns
    /// the number of triangles added. Any successful call, even one that
    /// splits nothing, ends the mesh's Delaunay state.
    pub fn refine_broken_triangles<F>(
        &mut self,
        is_broken: F,
        n_divide: usize,
    ) -> Result<usize, MeshError>
    where
        F: FnOnce(&MeshView<'_>) -> Vec<bool>,
    {
        if n_divide < 2 {
            return Err(MeshError::InvalidDivisionCount(n_divide));
        }
        let mut mask = is_broken(&self.view());
        check_mask(&mask, self.simplices.len())?;
        for (flag, &t) in mask.iter_mut().zip(&self.simplices) {
            if *flag && t.iter().all(|&v| !self.image[v].is_defined()) {
                *flag = false;
            }
        }

        let sources: Vec<[usize; 3]> = self
            .simplices
            .iter()
            .zip(&mask)
            .filter_map(|(&t, &broken)| broken.then_some(t))
            .collect();
        let corners: Vec<Corners> = sources
            .iter()
            .map(|&t| self.isolate_by_shortest_edge(t))
            .collect();
        let samples = self.resample_edges(&corners, n_divide)?;

        let mut staged = Subdivision::new(self.domain.len());
        for (k, (&source, tri)) in sources.iter().zip(&corners).enumerate() {
            let i = widest_segment(samples.image(k, Side::TowardA));
            let j = widest_segment(samples.image(k, Side::TowardB));
            let p1 = stage_sample(&mut staged, &samples, k, Side::TowardA, i);
            let p2 = stage_sample(&mut staged, &samples, k, Side::TowardB, j);
            let p3 = stage_sample(&mut staged, &samples, k, Side::TowardA, i + 1);
            let p4 = stage_sample(&mut staged, &samples, k, Side::TowardB, j + 1);
            let pieces = [
                [tri.c, p1, p2],
                [p1, p3, p2],
                [p2, p3, p4],
                [p4, p3, tri.a],
                [p4, tri.a, tri.b],
            ];

            let expected = self.staged_area(&staged, source).abs();
            let found: f64 = pieces
                .iter()
                .map(|&t| self.staged_area(&staged, t).abs())
                .sum();
            check_partition(k, expected, found)?;
            staged.simplices.extend(pieces);
        }

        let points = staged.domain.len();
        let added = self.merge_subdivision(staged, &mask, AreaPolicy::Conserve)?;
        log::info!(
            "broken-triangle refinement split {} triangles, added {points} points",
            sources.len()
        );
        Ok(added)
    }

    /// Cut away the part of each triangle next to its undefined vertices.
    ///
    /// With one undefined vertex `C`, the first defined samples walking out
    /// of `C` along `C -> A` and `C -> B` (`p1`, `p2`) bound the kept
    /// quadrilateral, emitted as `(p1, A, p2)` and `(A, B, p2)`. With two
    /// undefined vertices the last samples of the defined run leaving the
    /// valid vertex `C` give the single triangle `(p1, p2, C)`. Triangles
    /// with no or three undefined vertices are untouched.
    ///
    /// Returns the number of triangles added.
    pub fn refine_invalid_triangles(&mut self, n_divide: usize) -> Result<usize, MeshError> {
        if n_divide < 2 {
            return Err(MeshError::InvalidDivisionCount(n_divide));
        }

        let mut cases = Vec::new();
        for (index, &t) in self.simplices.iter().enumerate() {
            let undefined = t.map(|v| !self.image[v].is_defined());
            let count = undefined.iter().filter(|&&u| u).count();
            let apex = match count {
                1 => undefined.iter().position(|&u| u),
                2 => undefined.iter().position(|&u| !u),
                _ => None,
            };
            if let Some(apex) = apex {
                cases.push((index, count, Corners::rotated(t, apex)));
            }
        }
        let corners: Vec<Corners> = cases.iter().map(|&(_, _, c)| c).collect();
        let samples = self.resample_edges(&corners, n_divide)?;

        let mut mask = vec![false; self.simplices.len()];
        let mut staged = Subdivision::new(self.domain.len());
        for (k, &(index, count, tri)) in cases.iter().enumerate() {
            let toward_a = samples.image(k, Side::TowardA);
            let toward_b = samples.image(k, Side::TowardB);
            let bounds = if count == 1 {
                first_defined(toward_a).zip(first_defined(toward_b))
            } else {
                last_defined_from_start(toward_a).zip(last_defined_from_start(toward_b))
            };
            // the mapping disagreed with the vertex images it gave before
            let Some((i, j)) = bounds else {
                log::debug!("triangle {index} has no defined samples; kept");
                continue;
            };
            let p1 = stage_sample(&mut staged, &samples, k, Side::TowardA, i);
            let p2 = stage_sample(&mut staged, &samples, k, Side::TowardB, j);
            if count == 1 {
                staged.simplices.extend([[p1, tri.a, p2], [tri.a, tri.b, p2]]);
            } else {
                staged.simplices.push([p1, p2, tri.c]);
            }
            mask[index] = true;
        }

        let replaced = mask.iter().filter(|&&m| m).count();
        let points = staged.domain.len();
        let added = self.merge_subdivision(staged, &mask, AreaPolicy::NoGrowth)?;
        log::info!(
            "invalid-vertex refinement replaced {replaced} triangles, added {points} points"
        );
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_tolerance_is_relative_to_the_source_triangle() {
        assert!(check_partition(0, 0.5, 0.5 * (1.0 + 1e-12)).is_ok());
        assert!(check_partition(0, 1e-6, 1e-6 * (1.0 + 1e-12)).is_ok());

        // an absolute slack of 1e-12 is far beyond 1e-10 of a tiny triangle
        let err = check_partition(3, 1e-6, 1e-6 + 1e-12).unwrap_err();
        assert_eq!(
            err,
            MeshError::PartitionMismatch {
                triangle: 3,
                expected: 1e-6,
                found: 1e-6 + 1e-12,
            }
        );
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn nan_area_is_a_partition_mismatch() {
        assert!(check_partition(0, 0.5, f64::NAN).is_err());
    }
}
