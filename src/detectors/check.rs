//! Completeness check of the domain triangulation.

use std::f64::consts::PI;

use crate::detectors::{Detector, check_skip};
use crate::mesh::MeshView;
use crate::mesh_error::MeshError;

/// Triangulation error of one mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangulationError {
    /// `1 - mesh_area / reference_area`: area lost by approximating the
    /// domain boundary with straight edges.
    pub boundary: f64,
    /// Fraction of the mesh area in skipped triangles.
    pub skipped: f64,
}

/// Compares the domain area covered by each mesh with a reference area.
///
/// The weight is ignored. Fails on any triangle without strictly positive
/// domain area.
#[derive(Clone, Debug)]
pub struct CheckTriangulationDetector {
    reference_area: f64,
    reports: Vec<TriangulationError>,
}

impl Default for CheckTriangulationDetector {
    /// Reference area of the unit disk.
    fn default() -> Self {
        Self {
            reference_area: PI,
            reports: Vec::new(),
        }
    }
}

impl CheckTriangulationDetector {
    pub fn new(reference_area: f64) -> Result<Self, MeshError> {
        if !(reference_area > 0.0 && reference_area.is_finite()) {
            return Err(MeshError::InvalidDetector(format!(
                "reference area must be positive, got {reference_area}"
            )));
        }
        Ok(Self {
            reference_area,
            reports: Vec::new(),
        })
    }

    pub fn reference_area(&self) -> f64 {
        self.reference_area
    }

    /// One entry per `add`, in call order.
    pub fn reports(&self) -> &[TriangulationError] {
        &self.reports
    }
}

impl Detector for CheckTriangulationDetector {
    fn add(&mut self, mesh: &MeshView<'_>, skip: &[bool], _weight: f64) -> Result<(), MeshError> {
        check_skip(mesh, skip)?;
        let areas = mesh.area_in_domain(mesh.simplices);
        if let Some((triangle, &area)) = areas.iter().enumerate().find(|(_, a)| !(**a > 0.0)) {
            return Err(MeshError::NonPositiveArea { triangle, area });
        }
        let mesh_area: f64 = areas.iter().sum();
        let skipped_area: f64 = areas
            .iter()
            .zip(skip)
            .filter_map(|(a, &s)| s.then_some(a))
            .sum();
        let report = TriangulationError {
            boundary: 1.0 - mesh_area / self.reference_area,
            skipped: skipped_area / mesh_area,
        };
        log::info!(
            "error of triangulation of mesh: {:5.3}% due to approx. of mesh boundary, \
             {:5.3}% due to skipped triangles",
            100.0 * report.boundary,
            100.0 * report.skipped
        );
        self.reports.push(report);
        Ok(())
    }

    fn show(&self) -> String {
        let worst = |f: fn(&TriangulationError) -> f64| {
            self.reports.iter().map(f).fold(0.0_f64, |m, e| m.max(e.abs()))
        };
        let summary = format!(
            "{} meshes checked; worst boundary error {:5.3}%, worst skipped area {:5.3}%",
            self.reports.len(),
            100.0 * worst(|r| r.boundary),
            100.0 * worst(|r| r.skipped),
        );
        log::info!("{summary}");
        summary
    }
}
