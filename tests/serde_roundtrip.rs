mod util;

use flux_mesh::geometry::point::Point2;
use flux_mesh::mesh::AdaptiveMesh;
use flux_mesh::mesh::snapshot::MeshSnapshot;
use flux_mesh::transmission::{ParameterReport, TransmissionOptions, TransmissionReport};
use util::{broken_at, jump_at_half, undefined_beyond, unit_square};

#[test]
fn options_fill_missing_fields_with_defaults() {
    let opts: TransmissionOptions = serde_json::from_str(r#"{ "n_divide": 25 }"#).unwrap();
    assert_eq!(opts.n_divide, 25);
    assert_eq!(opts.length_threshold, None);
    assert_eq!(opts.area_threshold, TransmissionOptions::default().area_threshold);
    assert_eq!(opts.max_iterations, TransmissionOptions::default().max_iterations);

    let opts = TransmissionOptions::default().with_length_threshold(2.5);
    let json = serde_json::to_string(&opts).unwrap();
    let back: TransmissionOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back.length_threshold, Some(2.5));
    assert_eq!(back.n_divide, opts.n_divide);
    assert!((back.area_threshold - opts.area_threshold).abs() < 1e-15);
}

#[test]
fn snapshot_survives_json_with_undefined_images() {
    let mut mesh = AdaptiveMesh::new(&unit_square(), undefined_beyond).unwrap();
    mesh.refine_invalid_triangles(10).unwrap();
    let skip = vec![false; mesh.num_triangles()];
    let snap = mesh.snapshot(&skip).unwrap();
    assert!(!snap.delaunay);
    assert!(snap.image.iter().any(Option::is_none));

    let json = serde_json::to_string(&snap).unwrap();
    let back: MeshSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.version, snap.version);
    assert_eq!(back.simplices, snap.simplices);
    assert_eq!(back.skip, snap.skip);
    assert_eq!(back.delaunay, snap.delaunay);
    // JSON floats are compared loosely, parsing may be off by an ulp
    for (p, q) in back.domain.iter().zip(&snap.domain) {
        assert!(p.dist_sq(q) < 1e-24);
    }
    assert_eq!(back.image_points().len(), mesh.num_points());
    for (p, q) in back.image_points().iter().zip(mesh.image_points()) {
        assert_eq!(p.is_defined(), q.is_defined());
    }
}

#[test]
fn snapshot_keeps_only_unskipped_triangles() {
    let mut mesh = AdaptiveMesh::new(&unit_square(), jump_at_half).unwrap();
    mesh.refine_broken_triangles(broken_at(5.0), 10).unwrap();
    let skip = mesh.broken_triangles(mesh.simplices(), Some(5.0));
    let snap = mesh.snapshot(&skip).unwrap();
    let kept = skip.iter().filter(|&&s| !s).count();
    assert_eq!(snap.kept_simplices().count(), kept);
    assert!(mesh.snapshot(&skip[1..]).is_err());
}

#[test]
fn reports_roundtrip() {
    let report = TransmissionReport {
        parameters: vec![
            ParameterReport {
                index: 0,
                iterations: 3,
                converged: true,
                points: 120,
                triangles: 210,
                skipped: 4,
            },
            ParameterReport {
                index: 1,
                iterations: 64,
                converged: false,
                points: 980,
                triangles: 1900,
                skipped: 31,
            },
        ],
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["parameters"][1]["converged"], false);
    let back: TransmissionReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
    assert!(!back.all_converged());
    assert_eq!(back.total_points(), 1100);
}

#[test]
fn point_serializes_as_named_fields() {
    let json = serde_json::to_string(&Point2::new(1.5, -2.0)).unwrap();
    assert_eq!(json, r#"{"x":1.5,"y":-2.0}"#);
}
