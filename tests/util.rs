#![allow(dead_code)]
use flux_mesh::geometry::point::Point2;
use flux_mesh::mesh::AdaptiveMesh;
use flux_mesh::mesh::MeshView;

pub fn unit_square() -> Vec<Point2> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ]
}

/// `n x n` lattice over the unit square.
pub fn grid(n: usize) -> Vec<Point2> {
    let step = 1.0 / (n - 1) as f64;
    (0..n)
        .flat_map(|j| (0..n).map(move |i| Point2::new(i as f64 * step, j as f64 * step)))
        .collect()
}

/// Centre plus `rings` rings of `6 i` points on the unit disk.
pub fn disk(rings: usize) -> Vec<Point2> {
    let mut pts = vec![Point2::new(0.0, 0.0)];
    for i in 1..=rings {
        let r = i as f64 / rings as f64;
        let n = 6 * i;
        pts.extend((0..n).map(|k| {
            let phi = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
            Point2::new(r * phi.cos(), r * phi.sin())
        }));
    }
    pts
}

pub fn identity(pts: &[Point2]) -> Vec<Point2> {
    pts.to_vec()
}

/// Identity, except points right of `x = 0.5` jump by `+10` in `x`.
pub fn jump_at_half(pts: &[Point2]) -> Vec<Point2> {
    pts.iter()
        .map(|p| if p.x > 0.5 { Point2::new(p.x + 10.0, p.y) } else { *p })
        .collect()
}

/// Identity, undefined for `x > 0.8`.
pub fn undefined_beyond(pts: &[Point2]) -> Vec<Point2> {
    pts.iter()
        .map(|p| if p.x > 0.8 { Point2::UNDEFINED } else { *p })
        .collect()
}

pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

/// Every triangle positively oriented, all indices in range.
pub fn assert_well_formed<M, T>(mesh: &AdaptiveMesh<M, T>) {
    let n = mesh.num_points();
    assert_eq!(mesh.domain_points().len(), mesh.image_points().len());
    for (k, t) in mesh.simplices().iter().enumerate() {
        assert!(t.iter().all(|&v| v < n), "triangle {k} = {t:?} out of range");
    }
    for (k, a) in mesh.area_in_domain(mesh.simplices()).iter().enumerate() {
        assert!(*a > 0.0, "triangle {k} has area {a}");
    }
}

pub fn total_area(view: &MeshView<'_>) -> f64 {
    view.total_domain_area()
}

/// Broken-triangle predicate with a fixed length threshold.
pub fn broken_at(threshold: f64) -> impl Fn(&MeshView<'_>) -> Vec<bool> {
    move |view: &MeshView<'_>| view.broken_triangles(view.simplices, Some(threshold))
}
