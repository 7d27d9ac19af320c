mod util;

use flux_mesh::geometry::point::Point2;
use flux_mesh::mesh::classify::{broken_above_area, default_length_threshold, domain_area_above};
use flux_mesh::mesh::{AdaptiveMesh, MeshView};
use util::{grid, identity, jump_at_half, unit_square};

#[test]
fn smooth_mapping_has_no_broken_triangles_by_default() {
    let mesh = AdaptiveMesh::new(&grid(6), identity).unwrap();
    let broken = mesh.broken_triangles(mesh.simplices(), None);
    assert_eq!(broken.len(), mesh.num_triangles());
    assert!(broken.iter().all(|&b| !b));
}

#[test]
fn median_threshold_finds_the_jump() {
    let mesh = AdaptiveMesh::new(&grid(6), jump_at_half).unwrap();
    let view = mesh.view();
    let broken = view.broken_triangles(view.simplices, None);
    for (t, &b) in mesh.simplices().iter().zip(&broken) {
        let [a, b2, c] = view.domain_triangle(*t);
        let crosses = [a, b2, c].iter().any(|p| p.x > 0.5) && [a, b2, c].iter().any(|p| p.x <= 0.5);
        assert_eq!(b, crosses, "triangle {t:?}");
    }
}

#[test]
fn explicit_threshold_is_inclusive() {
    let pts = [
        Point2::new(0.0, 0.0),
        Point2::new(3.0, 0.0),
        Point2::new(0.0, 4.0),
    ];
    let mesh = AdaptiveMesh::new(&pts, identity).unwrap();
    // longest edge is the hypotenuse of length 5
    assert_eq!(mesh.broken_triangles(mesh.simplices(), Some(5.0)), vec![true]);
    assert_eq!(mesh.broken_triangles(mesh.simplices(), Some(5.001)), vec![false]);
}

#[test]
fn undefined_vertex_is_always_broken() {
    let mapping = |pts: &[Point2]| -> Vec<Point2> {
        pts.iter()
            .map(|p| if p.x > 0.9 && p.y > 0.9 { Point2::UNDEFINED } else { *p })
            .collect()
    };
    let mesh = AdaptiveMesh::new(&grid(3), mapping).unwrap();
    let view = mesh.view();
    for threshold in [None, Some(1e3), Some(f64::INFINITY)] {
        let broken = view.broken_triangles(view.simplices, threshold);
        for (&t, &b) in view.simplices.iter().zip(&broken) {
            if view.has_undefined_vertex(t) {
                assert!(b, "triangle {t:?} with undefined vertex not broken at {threshold:?}");
            }
        }
    }
    // the undefined corner does not poison the median
    let lengths = view.max_image_edge_len_sq(view.simplices);
    assert!(default_length_threshold(&lengths).is_finite());
}

#[test]
fn subset_classification_keeps_alignment() {
    let mesh = AdaptiveMesh::new(&grid(4), jump_at_half).unwrap();
    let subset: Vec<[usize; 3]> = mesh.simplices().iter().step_by(2).copied().collect();
    let all = mesh.broken_triangles(mesh.simplices(), Some(5.0));
    let part = mesh.broken_triangles(&subset, Some(5.0));
    let expected: Vec<bool> = all.iter().step_by(2).copied().collect();
    assert_eq!(part, expected);
}

#[test]
fn area_filters() {
    let mesh = AdaptiveMesh::new(&unit_square(), jump_at_half).unwrap();
    let view: MeshView<'_> = mesh.view();
    assert_eq!(domain_area_above(0.4)(&view), vec![true, true]);
    assert_eq!(domain_area_above(0.5)(&view), vec![false, false]);
    assert_eq!(broken_above_area(Some(5.0), 0.4)(&view), vec![true, true]);
    assert_eq!(broken_above_area(Some(5.0), 0.5)(&view), vec![false, false]);
    assert_eq!(broken_above_area(Some(50.0), 0.0)(&view), vec![false, false]);
}
