mod util;

use flux_mesh::geometry::point::{Point2, points_as_flat};
use flux_mesh::mesh::classify::domain_area_above;
use flux_mesh::mesh::{AdaptiveMesh, MeshView};
use flux_mesh::mesh_error::MeshError;
use util::{assert_well_formed, grid, identity, unit_square};

#[test]
fn square_is_two_triangles_of_half_area() {
    let mesh = AdaptiveMesh::new(&unit_square(), identity).unwrap();
    assert_eq!(mesh.num_triangles(), 2);
    assert_eq!(mesh.num_points(), 4);
    assert!(mesh.is_delaunay());
    for a in mesh.area_in_domain(mesh.simplices()) {
        assert!((a - 0.5).abs() < 1e-12);
    }
    assert!((mesh.initial_domain_area() - 1.0).abs() < 1e-12);
    assert_eq!(mesh.initial_domain(), unit_square().as_slice());
    assert_eq!(mesh.initial_image(), unit_square().as_slice());
    assert_well_formed(&mesh);
}

#[test]
fn image_area_sign_is_reported_as_is() {
    let mirror = |pts: &[Point2]| -> Vec<Point2> {
        pts.iter().map(|p| Point2::new(-p.x, p.y)).collect()
    };
    let mesh = AdaptiveMesh::new(&unit_square(), mirror).unwrap();
    for a in mesh.area_in_image(mesh.simplices()) {
        assert!((a + 0.5).abs() < 1e-12, "mirrored triangle should have area -0.5, got {a}");
    }
}

#[test]
fn flat_buffer_constructor() {
    let pts = unit_square();
    let mesh = AdaptiveMesh::from_flat(points_as_flat(&pts), identity).unwrap();
    assert_eq!(mesh.num_triangles(), 2);

    let err = AdaptiveMesh::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0], identity).unwrap_err();
    assert_eq!(err, MeshError::OddCoordinateBuffer(5));
    assert!(err.is_configuration_error());
}

#[test]
fn construction_errors_are_configuration_errors() {
    let too_few = AdaptiveMesh::new(&unit_square()[..2], identity).unwrap_err();
    assert_eq!(too_few, MeshError::TooFewPoints(2));

    let mut pts = unit_square();
    pts[1] = Point2::new(f64::INFINITY, 0.0);
    let non_finite = AdaptiveMesh::new(&pts, identity).unwrap_err();
    assert_eq!(non_finite, MeshError::NonFiniteDomainPoint { index: 1 });

    let collinear = [
        Point2::new(0.0, 0.0),
        Point2::new(0.5, 0.5),
        Point2::new(1.0, 1.0),
    ];
    let degenerate = AdaptiveMesh::new(&collinear, identity).unwrap_err();
    assert_eq!(degenerate, MeshError::DegenerateTriangulation);

    let drop_first = |pts: &[Point2]| pts[1..].to_vec();
    let shape = AdaptiveMesh::new(&unit_square(), drop_first).unwrap_err();
    assert_eq!(
        shape,
        MeshError::MappingShapeMismatch {
            expected: 4,
            found: 3
        }
    );

    for err in [too_few, non_finite, degenerate, shape] {
        assert!(err.is_configuration_error());
        assert!(!err.is_invariant_violation());
    }
}

#[test]
fn mapping_is_called_once_per_batch() {
    use std::cell::Cell;
    let calls = Cell::new(0usize);
    let counting = |pts: &[Point2]| {
        calls.set(calls.get() + 1);
        pts.to_vec()
    };
    let mut mesh = AdaptiveMesh::new(&grid(3), counting).unwrap();
    assert_eq!(calls.get(), 1);
    mesh.refine_large_triangles(domain_area_above(0.0)).unwrap();
    assert_eq!(calls.get(), 2);
    // nothing flagged: no mapping call
    let none = mesh
        .refine_large_triangles(|view: &MeshView<'_>| vec![false; view.simplices.len()])
        .unwrap();
    assert_eq!(none, 0);
    assert_eq!(calls.get(), 2);
}

#[test]
fn large_refinement_inserts_centroids_and_stays_delaunay() {
    let mut mesh = AdaptiveMesh::new(&grid(3), identity).unwrap();
    assert_eq!(mesh.num_triangles(), 8);

    let added = mesh.refine_large_triangles(domain_area_above(0.1)).unwrap();
    assert_eq!(added, 8);
    assert_eq!(mesh.num_points(), 17);
    assert!(mesh.is_delaunay());
    assert!((mesh.view().total_domain_area() - 1.0).abs() < 1e-12);
    assert_well_formed(&mesh);

    // every new point is the centroid of an old triangle and was mapped
    for (d, i) in mesh.domain_points()[9..].iter().zip(&mesh.image_points()[9..]) {
        assert_eq!(d, i);
    }

    let nothing = mesh.refine_large_triangles(domain_area_above(1.0)).unwrap();
    assert_eq!(nothing, 0);
    assert_eq!(mesh.num_points(), 17);
}

#[test]
fn large_refinement_checks_mask_length() {
    let mut mesh = AdaptiveMesh::new(&unit_square(), identity).unwrap();
    let err = mesh.refine_large_triangles(|_| vec![true]).unwrap_err();
    assert_eq!(
        err,
        MeshError::MaskLengthMismatch {
            expected: 2,
            found: 1
        }
    );
    assert_eq!(mesh.num_points(), 4);
}
