//! Detectors accumulating the contribution of refined meshes.
//!
//! A [`Detector`] is handed the final mesh of every parameter sample together
//! with a skip mask (triangles that stayed broken) and the sample's weight.
//! The flux through a triangle is distributed over its image with density
//!
//! ```text
//! weight * |a_domain / sum(|a_domain|)| / |a_image|
//! ```
//!
//! so a triangle that is compressed by the mapping lights its pixels more
//! brightly. Triangles with an undefined vertex or a collapsed image carry no
//! finite density and are left out.
//!
//! # Expected invariants
//! - `add` never mutates the mesh and `show` never mutates accumulated state.
//! - `skip` is aligned with `mesh.simplices`.

pub mod check;
pub mod polar;
pub mod rect;

pub use check::CheckTriangulationDetector;
pub use polar::PolarImageDetector;
pub use rect::RectImageDetector;

use crate::geometry::point::Point2;
use crate::geometry::predicates::point_in_triangle;
use crate::mesh::MeshView;
use crate::mesh_error::MeshError;

/// Accumulator fed by the transmission driver.
///
/// `Send` so that detectors can sit behind a lock shared by worker threads.
pub trait Detector: Send {
    /// Accumulate the contribution of `mesh`, leaving out triangles flagged in `skip`.
    fn add(&mut self, mesh: &MeshView<'_>, skip: &[bool], weight: f64) -> Result<(), MeshError>;

    /// Human-readable summary of everything accumulated so far.
    fn show(&self) -> String;
}

pub(crate) fn check_skip(mesh: &MeshView<'_>, skip: &[bool]) -> Result<(), MeshError> {
    if skip.len() != mesh.simplices.len() {
        return Err(MeshError::MaskLengthMismatch {
            expected: mesh.simplices.len(),
            found: skip.len(),
        });
    }
    Ok(())
}

/// Flux density on the image of each triangle; non-finite where the image
/// is undefined or collapsed.
pub fn flux_densities(mesh: &MeshView<'_>, weight: f64) -> Vec<f64> {
    let domain = mesh.area_in_domain(mesh.simplices);
    let total: f64 = domain.iter().map(|a| a.abs()).sum();
    let image = mesh.area_in_image(mesh.simplices);
    domain
        .iter()
        .zip(&image)
        .map(|(a_domain, a_image)| weight * (a_domain / total).abs() / a_image.abs())
        .collect()
}

/// Triangles to deposit: not skipped and with finite density.
pub(crate) fn deposits<'v>(
    mesh: &'v MeshView<'_>,
    skip: &'v [bool],
    weight: f64,
) -> impl Iterator<Item = ([Point2; 3], f64)> + 'v {
    let densities = flux_densities(mesh, weight);
    let skipped_nonfinite = densities
        .iter()
        .zip(skip)
        .filter(|&(d, &s)| !s && !d.is_finite())
        .count();
    if skipped_nonfinite > 0 {
        log::debug!("{skipped_nonfinite} triangles without finite flux density left out");
    }
    mesh.simplices
        .iter()
        .zip(skip)
        .zip(densities)
        .filter(|&((_, &s), d)| !s && d.is_finite())
        .map(move |((&t, _), d)| (mesh.image_triangle(t), d))
}

/// Add `density` to every entry of `intensity` whose point lies in `triangle`.
pub(crate) fn deposit(
    points: &[Point2],
    intensity: &mut [f64],
    triangle: [Point2; 3],
    density: f64,
) {
    let [a, b, c] = triangle;
    let (min_x, max_x) = (a.x.min(b.x).min(c.x), a.x.max(b.x).max(c.x));
    let (min_y, max_y) = (a.y.min(b.y).min(c.y), a.y.max(b.y).max(c.y));
    for (p, value) in points.iter().zip(intensity.iter_mut()) {
        if p.x < min_x || p.x > max_x || p.y < min_y || p.y > max_y {
            continue;
        }
        if point_in_triangle(p, &a, &b, &c) {
            *value += density;
        }
    }
}
