//! Cartesian image detector.

use crate::detectors::{Detector, check_skip, deposits};
use crate::geometry::point::Point2;
use crate::geometry::predicates::point_in_triangle;
use crate::mesh::MeshView;
use crate::mesh_error::MeshError;

/// Pixel grid over `[-w/2, w/2] x [-h/2, h/2]` in image space.
///
/// Pixel centres include the borders of the extent; intensity is stored row
/// by row (`y` outer, `x` inner).
#[derive(Clone, Debug)]
pub struct RectImageDetector {
    extent: (f64, f64),
    pixels: (usize, usize),
    points: Vec<Point2>,
    intensity: Vec<f64>,
}

impl RectImageDetector {
    /// Detector of size `extent = (width, height)` with `pixels = (nx, ny)`
    /// pixels; at least two pixels per axis.
    pub fn new(extent: (f64, f64), pixels: (usize, usize)) -> Result<Self, MeshError> {
        let (w, h) = extent;
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return Err(MeshError::InvalidDetector(format!(
                "extent must be positive, got {w} x {h}"
            )));
        }
        let (nx, ny) = pixels;
        if nx < 2 || ny < 2 {
            return Err(MeshError::InvalidDetector(format!(
                "need at least 2 x 2 pixels, got {nx} x {ny}"
            )));
        }
        let mut det = Self {
            extent,
            pixels,
            points: Vec::with_capacity(nx * ny),
            intensity: vec![0.0; nx * ny],
        };
        for j in 0..ny {
            for i in 0..nx {
                det.points.push(Point2::new(det.x(i), det.y(j)));
            }
        }
        Ok(det)
    }

    fn dx(&self) -> f64 {
        self.extent.0 / (self.pixels.0 - 1) as f64
    }

    fn dy(&self) -> f64 {
        self.extent.1 / (self.pixels.1 - 1) as f64
    }

    fn x(&self, i: usize) -> f64 {
        -0.5 * self.extent.0 + i as f64 * self.dx()
    }

    fn y(&self, j: usize) -> f64 {
        -0.5 * self.extent.1 + j as f64 * self.dy()
    }

    /// Pixel index range covering `[lo, hi]` along an axis starting at `origin`.
    fn span(lo: f64, hi: f64, origin: f64, step: f64, n: usize) -> std::ops::Range<usize> {
        let first = ((lo - origin) / step).ceil().max(0.0);
        let last = ((hi - origin) / step).floor().min((n - 1) as f64);
        if !(first <= last) {
            return 0..0;
        }
        first as usize..last as usize + 1
    }

    pub fn pixels(&self) -> (usize, usize) {
        self.pixels
    }

    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    /// Pixel centres in storage order.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Accumulated intensity in storage order.
    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// Intensity of pixel `(i, j)`.
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.intensity[j * self.pixels.0 + i]
    }

    /// Integrated intensity, `sum * dx * dy`.
    pub fn total_intensity(&self) -> f64 {
        self.intensity.iter().sum::<f64>() * self.dx() * self.dy()
    }

    /// Intensity integrated along `y`, as a function of `x`.
    pub fn profile_x(&self) -> Vec<f64> {
        let (nx, ny) = self.pixels;
        (0..nx)
            .map(|i| (0..ny).map(|j| self.at(i, j)).sum::<f64>() * self.dy())
            .collect()
    }

    /// Intensity integrated along `x`, as a function of `y`.
    pub fn profile_y(&self) -> Vec<f64> {
        let nx = self.pixels.0;
        self.intensity
            .chunks(nx)
            .map(|row| row.iter().sum::<f64>() * self.dx())
            .collect()
    }
}

impl Detector for RectImageDetector {
    fn add(&mut self, mesh: &MeshView<'_>, skip: &[bool], weight: f64) -> Result<(), MeshError> {
        check_skip(mesh, skip)?;
        let (nx, ny) = self.pixels;
        let (x0, y0) = (self.x(0), self.y(0));
        let (dx, dy) = (self.dx(), self.dy());
        for ([a, b, c], density) in deposits(mesh, skip, weight) {
            let cols = Self::span(a.x.min(b.x).min(c.x), a.x.max(b.x).max(c.x), x0, dx, nx);
            let rows = Self::span(a.y.min(b.y).min(c.y), a.y.max(b.y).max(c.y), y0, dy, ny);
            for j in rows {
                for i in cols.clone() {
                    let k = j * nx + i;
                    if point_in_triangle(&self.points[k], &a, &b, &c) {
                        self.intensity[k] += density;
                    }
                }
            }
        }
        Ok(())
    }

    fn show(&self) -> String {
        let summary = format!(
            "rect detector {} x {} pixels over {} x {}: total intensity {:5.3} W",
            self.pixels.0,
            self.pixels.1,
            self.extent.0,
            self.extent.1,
            self.total_intensity()
        );
        log::info!("{summary}");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_borders() {
        let det = RectImageDetector::new((2.0, 1.0), (5, 3)).unwrap();
        assert_eq!(det.points()[0], Point2::new(-1.0, -0.5));
        assert_eq!(det.points()[14], Point2::new(1.0, 0.5));
        assert!(RectImageDetector::new((1.0, 1.0), (1, 4)).is_err());
        assert!(RectImageDetector::new((0.0, 1.0), (4, 4)).is_err());
    }

    #[test]
    fn span_clamps_to_grid() {
        assert_eq!(RectImageDetector::span(-0.3, 0.3, -1.0, 0.5, 5), 2..3);
        assert_eq!(RectImageDetector::span(-5.0, 5.0, -1.0, 0.5, 5), 0..5);
        assert_eq!(RectImageDetector::span(2.0, 3.0, -1.0, 0.5, 5), 0..0);
    }
}
