//! Planar predicates: signed area, orientation, in-circle and point-in-triangle.
//!
//! All predicates use plain `f64` arithmetic. Callers that sit on a boundary
//! (point exactly on an edge, four cocircular points) get whichever side the
//! rounding produces; the Delaunay structure and the detectors tolerate that.

use crate::geometry::point::Point2;

/// Signed area of the triangle `(a, b, c)`; positive for counter-clockwise order.
#[inline]
pub fn signed_area(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

/// Twice the signed area; the sign tells on which side of `a -> b` the point `c` lies.
#[inline]
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Positive if `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `(a, b, c)`, negative outside, zero on it.
pub fn incircle(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> f64 {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    alift * (bdx * cdy - cdx * bdy) + blift * (cdx * ady - adx * cdy)
        + clift * (adx * bdy - bdx * ady)
}

/// True if `p` lies inside or on the boundary of triangle `(a, b, c)`,
/// for either vertex orientation. Undefined inputs are never inside.
pub fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let d0 = orient2d(a, b, p);
    let d1 = orient2d(b, c, p);
    let d2 = orient2d(c, a, p);
    if d0.is_nan() || d1.is_nan() || d2.is_nan() {
        return false;
    }
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

/// Membership mask of `points` in triangle `(a, b, c)`.
pub fn points_in_triangle(points: &[Point2], triangle: [Point2; 3]) -> Vec<bool> {
    let [a, b, c] = triangle;
    points
        .iter()
        .map(|p| point_in_triangle(p, &a, &b, &c))
        .collect()
}
