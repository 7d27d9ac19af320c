//! Classification of broken and large triangles.
//!
//! A discontinuity of the mapping (vignetting edge, aperture boundary) shows
//! up as a triangle with an anomalously long edge in image space. Without an
//! explicit threshold, a triangle is broken when its longest image edge is at
//! least three times the square root of the median squared longest edge across
//! the classified triangles, which adapts to the sampling density.
//!
//! A triangle with an undefined vertex is always broken, whatever the length
//! of its defined edges.

use crate::geometry::point::Point2;
use crate::mesh::{AdaptiveMesh, MeshView};
use itertools::Itertools;

/// Multiple of the median edge length used when no threshold is given.
pub const DEFAULT_THRESHOLD_FACTOR: f64 = 3.0;

/// Longest squared image-space edge of a triangle; NaN if a vertex is undefined.
fn max_edge_len_sq(t: [Point2; 3]) -> f64 {
    if t.iter().any(|p| !p.is_defined()) {
        return f64::NAN;
    }
    let [a, b, c] = t;
    a.dist_sq(&b).max(b.dist_sq(&c)).max(c.dist_sq(&a))
}

/// Median of the finite entries of `values`, or `None` if there are none.
fn finite_median(values: &[f64]) -> Option<f64> {
    let sorted = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .sorted_by(f64::total_cmp)
        .collect_vec();
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2])),
    }
}

/// Default length threshold for a set of per-triangle longest squared edges.
///
/// Undefined or infinite entries are ignored; if nothing finite remains the
/// threshold is infinite, so only triangles with undefined vertices break.
pub fn default_length_threshold(max_len_sq: &[f64]) -> f64 {
    finite_median(max_len_sq)
        .map(|median| DEFAULT_THRESHOLD_FACTOR * median.sqrt())
        .unwrap_or(f64::INFINITY)
}

impl<'a> MeshView<'a> {
    /// Longest squared image edge of each of `simplices`.
    pub fn max_image_edge_len_sq(&self, simplices: &[[usize; 3]]) -> Vec<f64> {
        simplices
            .iter()
            .map(|&t| max_edge_len_sq(self.image_triangle(t)))
            .collect()
    }

    /// Broken-triangle mask for `simplices`.
    ///
    /// A triangle is broken if its longest image edge is at least
    /// `length_threshold` (default: [`default_length_threshold`] over
    /// `simplices`) or if any of its vertices is undefined.
    pub fn broken_triangles(
        &self,
        simplices: &[[usize; 3]],
        length_threshold: Option<f64>,
    ) -> Vec<bool> {
        let max_len_sq = self.max_image_edge_len_sq(simplices);
        let threshold = length_threshold.unwrap_or_else(|| default_length_threshold(&max_len_sq));
        let threshold_sq = threshold * threshold;
        simplices
            .iter()
            .zip(&max_len_sq)
            .map(|(&t, &len_sq)| self.has_undefined_vertex(t) || !(len_sq < threshold_sq))
            .collect()
    }
}

impl<M, T> AdaptiveMesh<M, T> {
    /// Broken-triangle mask over `simplices`; see [`MeshView::broken_triangles`].
    pub fn broken_triangles(
        &self,
        simplices: &[[usize; 3]],
        length_threshold: Option<f64>,
    ) -> Vec<bool> {
        self.view().broken_triangles(simplices, length_threshold)
    }
}

/// Large-triangle predicate: domain area strictly above `threshold`.
pub fn domain_area_above(threshold: f64) -> impl Fn(&MeshView<'_>) -> Vec<bool> {
    move |view: &MeshView<'_>| {
        view.area_in_domain(view.simplices)
            .into_iter()
            .map(|area| area.abs() > threshold)
            .collect()
    }
}

/// Broken-triangle predicate restricted to triangles whose domain area is
/// strictly above `area_threshold`.
///
/// Smaller broken triangles are accepted as unresolvable, which bounds the
/// number of refinement passes.
pub fn broken_above_area(
    length_threshold: Option<f64>,
    area_threshold: f64,
) -> impl Fn(&MeshView<'_>) -> Vec<bool> {
    move |view: &MeshView<'_>| {
        let broken = view.broken_triangles(view.simplices, length_threshold);
        let areas = view.area_in_domain(view.simplices);
        broken
            .into_iter()
            .zip(areas)
            .map(|(is_broken, area)| is_broken && area > area_threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_ignores_non_finite_entries() {
        assert_eq!(finite_median(&[3.0, f64::NAN, 1.0, 2.0]), Some(2.0));
        assert_eq!(finite_median(&[4.0, 1.0, f64::INFINITY, 2.0, 3.0]), Some(2.5));
        assert_eq!(finite_median(&[f64::NAN]), None);
    }

    #[test]
    fn default_threshold_is_three_median_lengths() {
        assert_eq!(default_length_threshold(&[1.0, 4.0, 4.0]), 6.0);
        assert_eq!(default_length_threshold(&[]), f64::INFINITY);
    }

    #[test]
    fn undefined_vertex_breaks_short_triangle() {
        let domain = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let image = [
            Point2::new(0.0, 0.0),
            Point2::new(0.01, 0.0),
            Point2::UNDEFINED,
        ];
        let simplices = [[0, 1, 2]];
        let view = MeshView {
            domain: &domain,
            image: &image,
            simplices: &simplices,
        };
        assert_eq!(view.broken_triangles(&simplices, Some(100.0)), vec![true]);
    }
}
