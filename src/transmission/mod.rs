//! Accumulation driver: refine one mesh per parameter sample and feed the
//! detectors.
//!
//! For every parameter `p` (a field point, a wavelength, ...) the driver
//! builds an [`AdaptiveMesh`] over the shared initial points with the mapping
//! `points -> raytrace(p, points)`, splits broken triangles until a pass adds
//! nothing, and hands the final mesh to every [`Detector`] with the remaining
//! broken triangles as skip mask and the parameter's weight.
//!
//! Broken triangles with domain area at or below
//! [`TransmissionOptions::area_threshold`] are accepted as unresolvable, which
//! bounds the number of passes; [`TransmissionOptions::max_iterations`] caps
//! it regardless.
//!
//! # Expected invariants
//! - Meshes of distinct parameters share nothing and may be refined in
//!   parallel; detector `add` calls are serialized.
//! - Weights default to `1 / n` for `n` parameters.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::detectors::Detector;
use crate::geometry::point::Point2;
use crate::mapping::Mapping;
use crate::mesh::classify::broken_above_area;
use crate::mesh::AdaptiveMesh;
use crate::mesh_error::MeshError;

/// Refinement settings shared by all parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionOptions {
    /// Image-space edge length at which a triangle counts as broken.
    ///
    /// `None` recomputes the median-based default on every pass and again for
    /// the final skip mask, so the threshold floats as the mesh is refined.
    /// Set it to hold one threshold fixed across all passes.
    pub length_threshold: Option<f64>,
    /// Broken triangles with domain area at or below this are left as-is.
    pub area_threshold: f64,
    /// Samples per resampled edge, endpoints included.
    pub n_divide: usize,
    /// Upper bound on refinement passes per parameter.
    pub max_iterations: usize,
}

impl Default for TransmissionOptions {
    fn default() -> Self {
        Self {
            length_threshold: None,
            area_threshold: PI / 1000.0,
            n_divide: 100,
            max_iterations: 64,
        }
    }
}

impl TransmissionOptions {
    pub fn with_length_threshold(mut self, length_threshold: f64) -> Self {
        self.length_threshold = Some(length_threshold);
        self
    }
}

/// Outcome of refining the mesh of one parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterReport {
    /// Position of the parameter in the driver's list.
    pub index: usize,
    /// Refinement passes run, including the final one that added nothing.
    pub iterations: usize,
    /// False if the iteration cap stopped the loop.
    pub converged: bool,
    pub points: usize,
    pub triangles: usize,
    /// Triangles still broken and therefore skipped by the detectors.
    pub skipped: usize,
}

/// Per-parameter reports of a whole transmission run, in parameter order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionReport {
    pub parameters: Vec<ParameterReport>,
}

impl TransmissionReport {
    pub fn all_converged(&self) -> bool {
        self.parameters.iter().all(|r| r.converged)
    }

    pub fn total_points(&self) -> usize {
        self.parameters.iter().map(|r| r.points).sum()
    }
}

/// The raytrace bound to one parameter, usable as a [`Mapping`].
pub struct BoundRaytrace<'a, P, R> {
    parameter: &'a P,
    raytrace: &'a R,
}

impl<P, R> Mapping for BoundRaytrace<'_, P, R>
where
    R: Fn(&P, &[Point2]) -> Vec<Point2>,
{
    fn map(&self, domain: &[Point2]) -> Vec<Point2> {
        (self.raytrace)(self.parameter, domain)
    }
}

/// Transmission through a system sampled at discrete parameters.
#[derive(Clone, Debug)]
pub struct Transmission<P, R> {
    parameters: Vec<P>,
    mesh_points: Vec<Point2>,
    raytrace: R,
    weights: Vec<f64>,
}

impl<P, R> Transmission<P, R>
where
    R: Fn(&P, &[Point2]) -> Vec<Point2>,
{
    /// Driver over `parameters` with uniform weights `1 / n`.
    ///
    /// `raytrace(p, points)` must return one image point per input point,
    /// [`Point2::UNDEFINED`] where the ray does not arrive.
    pub fn new(parameters: Vec<P>, mesh_points: Vec<Point2>, raytrace: R) -> Self {
        let n = parameters.len();
        Self {
            parameters,
            mesh_points,
            raytrace,
            weights: vec![1.0 / n as f64; n],
        }
    }

    /// Replace the weights; one per parameter.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self, MeshError> {
        if weights.len() != self.parameters.len() {
            return Err(MeshError::WeightCountMismatch {
                parameters: self.parameters.len(),
                weights: weights.len(),
            });
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn parameters(&self) -> &[P] {
        &self.parameters
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn mesh_points(&self) -> &[Point2] {
        &self.mesh_points
    }

    /// Build and refine the mesh of parameter `index`.
    ///
    /// Returns the mesh, its skip mask (final broken triangles, no area
    /// filter) and the report.
    ///
    /// # Panics
    /// If `index` is not below the number of parameters.
    pub fn refine_parameter(
        &self,
        index: usize,
        options: &TransmissionOptions,
    ) -> Result<(AdaptiveMesh<BoundRaytrace<'_, P, R>>, Vec<bool>, ParameterReport), MeshError>
    {
        let mapping = BoundRaytrace {
            parameter: &self.parameters[index],
            raytrace: &self.raytrace,
        };
        log::info!("transmission for parameter {index}");
        let mut mesh = AdaptiveMesh::new(&self.mesh_points, mapping)?;
        let is_broken = broken_above_area(options.length_threshold, options.area_threshold);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < options.max_iterations {
            iterations += 1;
            let added = mesh.refine_broken_triangles(&is_broken, options.n_divide)?;
            log::debug!(
                "parameter {index}, pass {iterations}: {added} triangles added, {} total",
                mesh.num_triangles()
            );
            if added == 0 {
                converged = true;
                break;
            }
        }
        if !converged {
            log::warn!(
                "parameter {index}: refinement stopped after {iterations} passes without converging"
            );
        }

        let skip = mesh.broken_triangles(mesh.simplices(), options.length_threshold);
        let report = ParameterReport {
            index,
            iterations,
            converged,
            points: mesh.num_points(),
            triangles: mesh.num_triangles(),
            skipped: skip.iter().filter(|&&s| s).count(),
        };
        Ok((mesh, skip, report))
    }

    /// Incoherent sum over all parameters on `detectors`, one parameter
    /// after another.
    ///
    /// The first error stops the run. Detectors keep the contributions of the
    /// parameters added before it; reset them before reusing after a failure.
    pub fn total_transmission(
        &self,
        detectors: &mut [&mut dyn Detector],
        options: &TransmissionOptions,
    ) -> Result<TransmissionReport, MeshError> {
        let mut report = TransmissionReport::default();
        for index in 0..self.parameters.len() {
            let (mesh, skip, parameter) = self.refine_parameter(index, options)?;
            let view = mesh.view();
            for detector in detectors.iter_mut() {
                detector.add(&view, &skip, self.weights[index])?;
            }
            report.parameters.push(parameter);
        }
        Ok(report)
    }

    /// Like [`Transmission::total_transmission`], refining the parameters on
    /// the rayon pool. Each detector sits behind its own lock, so `add`
    /// calls arrive in no particular order.
    ///
    /// On error the detectors hold whichever parameters finished before the
    /// pool stopped, which is not necessarily a prefix of the list.
    #[cfg(feature = "parallel")]
    pub fn total_transmission_par(
        &self,
        detectors: &mut [&mut dyn Detector],
        options: &TransmissionOptions,
    ) -> Result<TransmissionReport, MeshError>
    where
        P: Sync,
        R: Sync,
    {
        use parking_lot::Mutex;
        use rayon::prelude::*;

        let locked: Vec<_> = detectors
            .iter_mut()
            .map(|d| Mutex::new(&mut **d))
            .collect();
        let parameters = (0..self.parameters.len())
            .into_par_iter()
            .map(|index| {
                let (mesh, skip, parameter) = self.refine_parameter(index, options)?;
                let view = mesh.view();
                for detector in &locked {
                    detector.lock().add(&view, &skip, self.weights[index])?;
                }
                Ok::<_, MeshError>(parameter)
            })
            .collect::<Result<Vec<_>, MeshError>>()?;
        Ok(TransmissionReport { parameters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = TransmissionOptions::default();
        assert_eq!(opts.n_divide, 100);
        assert_eq!(opts.length_threshold, None);
        assert!((opts.area_threshold - PI / 1000.0).abs() < 1e-15);
        assert_eq!(opts.with_length_threshold(2.0).length_threshold, Some(2.0));
    }

    #[test]
    fn weights_must_match_parameters() {
        let trace = |_: &u8, pts: &[Point2]| pts.to_vec();
        let t = Transmission::new(vec![1u8, 2], Vec::new(), trace);
        assert_eq!(t.weights(), &[0.5, 0.5]);
        assert!(matches!(
            t.with_weights(vec![1.0]),
            Err(MeshError::WeightCountMismatch {
                parameters: 2,
                weights: 1
            })
        ));
    }
}
