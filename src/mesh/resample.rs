//! Dense resampling of the two edges leaving a triangle's isolated apex.
//!
//! For a triangle relabelled `(C, A, B)` (a cyclic rotation, so the
//! orientation is kept) the segments `C -> A` and `C -> B` are sampled at
//! `n_divide` evenly spaced points including both endpoints, and the whole
//! batch of every triangle is mapped with a single mapping call.

use crate::geometry::point::{Point2, sample_gap};
use crate::mapping::{Mapping, map_checked};
use crate::mesh::AdaptiveMesh;
use crate::mesh_error::MeshError;
use itertools::Itertools;

/// A triangle rotated so that `c` is the isolated apex; `(c, a, b)` keeps the
/// orientation of the source simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Corners {
    pub c: usize,
    pub a: usize,
    pub b: usize,
}

impl Corners {
    /// Rotate `t` so that vertex `apex` (0, 1 or 2) becomes `C`.
    pub fn rotated(t: [usize; 3], apex: usize) -> Self {
        Self {
            c: t[apex % 3],
            a: t[(apex + 1) % 3],
            b: t[(apex + 2) % 3],
        }
    }
}

/// Which resampled edge of a triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    TowardA = 0,
    TowardB = 1,
}

/// Samples along `C -> A` and `C -> B` for a batch of triangles.
///
/// Layout: triangle `k`, side `s`, sample `i` lives at `(2k + s) * n + i`.
#[derive(Clone, Debug)]
pub(crate) struct EdgeSamples {
    n_divide: usize,
    domain: Vec<Point2>,
    image: Vec<Point2>,
}

impl EdgeSamples {
    fn range(&self, k: usize, side: Side) -> std::ops::Range<usize> {
        let start = (2 * k + side as usize) * self.n_divide;
        start..start + self.n_divide
    }

    pub fn domain(&self, k: usize, side: Side) -> &[Point2] {
        &self.domain[self.range(k, side)]
    }

    pub fn image(&self, k: usize, side: Side) -> &[Point2] {
        &self.image[self.range(k, side)]
    }
}

/// Index `i` of the widest step `image[i] -> image[i + 1]`, first on ties.
///
/// Width is [`sample_gap`], so the step from an undefined sample to a defined
/// one (or back) always wins.
pub(crate) fn widest_segment(image: &[Point2]) -> usize {
    image
        .iter()
        .tuple_windows()
        .map(|(p, q)| sample_gap(p, q))
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, gap)| {
            if gap > best.1 { (i, gap) } else { best }
        })
        .0
}

/// Index of the first defined sample.
pub(crate) fn first_defined(image: &[Point2]) -> Option<usize> {
    image.iter().position(Point2::is_defined)
}

/// Index of the last sample of the defined run that starts at `image[0]`.
pub(crate) fn last_defined_from_start(image: &[Point2]) -> Option<usize> {
    match image.iter().position(|p| !p.is_defined()) {
        Some(0) => None,
        Some(i) => Some(i - 1),
        None => image.len().checked_sub(1),
    }
}

impl<M: Mapping, T> AdaptiveMesh<M, T> {
    /// Rotate `t` so that `C` is opposite its shortest image edge (the edge
    /// least likely to be cut); ties go to the first edge.
    pub(crate) fn isolate_by_shortest_edge(&self, t: [usize; 3]) -> Corners {
        let gaps = [0, 1, 2].map(|k| sample_gap(&self.image[t[k]], &self.image[t[(k + 1) % 3]]));
        let shortest = (0..3)
            .fold(0, |best, k| if gaps[k] < gaps[best] { k } else { best });
        Corners::rotated(t, shortest + 2)
    }

    /// Sample `C -> A` and `C -> B` of every triangle in `corners` and map
    /// all samples at once.
    pub(crate) fn resample_edges(
        &self,
        corners: &[Corners],
        n_divide: usize,
    ) -> Result<EdgeSamples, MeshError> {
        if n_divide < 2 {
            return Err(MeshError::InvalidDivisionCount(n_divide));
        }
        let last = (n_divide - 1) as f64;
        let mut domain = Vec::with_capacity(2 * n_divide * corners.len());
        for tri in corners {
            let c = self.domain[tri.c];
            for end in [self.domain[tri.a], self.domain[tri.b]] {
                domain.extend((0..n_divide).map(|i| c.lerp(&end, i as f64 / last)));
            }
        }
        let image = map_checked(&self.mapping, &domain)?;
        Ok(EdgeSamples {
            n_divide,
            domain,
            image,
        })
    }
}
