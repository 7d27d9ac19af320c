//! Polar image detector with radial profile and encircled energy.

use std::f64::consts::PI;

use crate::detectors::{Detector, check_skip, deposit, deposits};
use crate::geometry::point::Point2;
use crate::mesh::MeshView;
use crate::mesh_error::MeshError;

/// Concentric rings of sample points around the image origin.
///
/// Ring `0` is the centre point, ring `i > 0` has radius `i * rmax / (nrings - 1)`
/// and `6 i` evenly spaced points. Each ring stands for the annulus halfway
/// to its neighbours (clipped to `[0, rmax]`); its weight is that annulus'
/// share of the disk area.
#[derive(Clone, Debug)]
pub struct PolarImageDetector {
    rmax: f64,
    points: Vec<Point2>,
    /// Start of each ring in `points`, plus the total at the end.
    ring_offsets: Vec<usize>,
    ring_weights: Vec<f64>,
    intensity: Vec<f64>,
}

impl PolarImageDetector {
    /// Detector of radius `rmax` with `nrings >= 2` rings.
    pub fn new(rmax: f64, nrings: usize) -> Result<Self, MeshError> {
        if !(rmax > 0.0 && rmax.is_finite()) {
            return Err(MeshError::InvalidDetector(format!(
                "radius must be positive, got {rmax}"
            )));
        }
        if nrings < 2 {
            return Err(MeshError::InvalidDetector(format!(
                "need at least 2 rings, got {nrings}"
            )));
        }
        let dr = rmax / (nrings - 1) as f64;
        let mut points = vec![Point2::new(0.0, 0.0)];
        let mut ring_offsets = vec![0, 1];
        for i in 1..nrings {
            let r = i as f64 * dr;
            let n = 6 * i;
            points.extend((0..n).map(|k| {
                let phi = 2.0 * PI * k as f64 / n as f64;
                Point2::new(r * phi.cos(), r * phi.sin())
            }));
            ring_offsets.push(points.len());
        }
        let ring_weights = (0..nrings)
            .map(|i| {
                let inner = (i as f64 - 0.5).max(0.0) * dr;
                let outer = ((i as f64 + 0.5) * dr).min(rmax);
                (outer * outer - inner * inner) / (rmax * rmax)
            })
            .collect();
        let intensity = vec![0.0; points.len()];
        Ok(Self {
            rmax,
            points,
            ring_offsets,
            ring_weights,
            intensity,
        })
    }

    pub fn rmax(&self) -> f64 {
        self.rmax
    }

    pub fn nrings(&self) -> usize {
        self.ring_weights.len()
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// Share of the disk area represented by each ring; sums to one.
    pub fn ring_weights(&self) -> &[f64] {
        &self.ring_weights
    }

    /// Radius of each ring.
    pub fn radii(&self) -> Vec<f64> {
        let dr = self.rmax / (self.nrings() - 1) as f64;
        (0..self.nrings()).map(|i| i as f64 * dr).collect()
    }

    /// Mean intensity on each ring.
    pub fn radial_profile(&self) -> Vec<f64> {
        self.ring_offsets
            .windows(2)
            .map(|w| {
                let ring = &self.intensity[w[0]..w[1]];
                ring.iter().sum::<f64>() / ring.len() as f64
            })
            .collect()
    }

    /// Energy inside each ring's outer annulus boundary; the last entry is
    /// the total on the detector.
    pub fn encircled_energy(&self) -> Vec<f64> {
        let disk = PI * self.rmax * self.rmax;
        self.radial_profile()
            .iter()
            .zip(&self.ring_weights)
            .scan(0.0, |acc, (profile, weight)| {
                *acc += profile * weight * disk;
                Some(*acc)
            })
            .collect()
    }
}

impl Detector for PolarImageDetector {
    fn add(&mut self, mesh: &MeshView<'_>, skip: &[bool], weight: f64) -> Result<(), MeshError> {
        check_skip(mesh, skip)?;
        for (triangle, density) in deposits(mesh, skip, weight) {
            deposit(&self.points, &mut self.intensity, triangle, density);
        }
        Ok(())
    }

    fn show(&self) -> String {
        let total = self.encircled_energy().last().copied().unwrap_or(0.0);
        let summary = format!(
            "polar detector {} rings up to r = {}: total intensity {:5.3} W",
            self.nrings(),
            self.rmax,
            total
        );
        log::info!("{summary}");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_have_six_i_points_and_weights_sum_to_one() {
        let det = PolarImageDetector::new(2.0, 4).unwrap();
        assert_eq!(det.points().len(), 1 + 6 + 12 + 18);
        let sum: f64 = det.ring_weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        let radii = det.radii();
        assert_eq!(radii.len(), 4);
        assert!((radii[3] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_single_ring() {
        assert!(PolarImageDetector::new(1.0, 1).is_err());
        assert!(PolarImageDetector::new(-1.0, 10).is_err());
    }
}
