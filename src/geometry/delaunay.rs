//! Incremental Delaunay triangulation via Bowyer–Watson insertion.
//!
//! The adaptive mesh only needs two capabilities from a Delaunay structure:
//! build a triangulation of a point set, and insert further points while
//! keeping it Delaunay. [`IncrementalTriangulation`] names exactly that, so a
//! different library can be substituted without touching the mesh.
//!
//! [`BowyerWatson`] keeps its triangles inside an enclosing super-triangle
//! whose three vertices occupy the first three internal slots. Point indices
//! reported through [`IncrementalTriangulation::simplices`] are the insertion
//! order of the caller's points, so they line up with the mesh's point arrays.
//! A point that coincides with an existing vertex is accepted (its index is
//! consumed) but left out of the triangulation.

use crate::geometry::point::Point2;
use crate::geometry::predicates::{incircle, orient2d};
use crate::mesh_error::MeshError;
use hashbrown::{HashMap, HashSet};

/// Build-and-insert capability required by [`crate::mesh::AdaptiveMesh`].
pub trait IncrementalTriangulation: Sized {
    /// Triangulate `points`; indices in the result refer to positions in `points`.
    fn triangulate(points: &[Point2]) -> Result<Self, MeshError>;
    /// Append `points` (indices continue after the existing ones) and restore
    /// the Delaunay property. Existing edges may flip.
    fn insert(&mut self, points: &[Point2]) -> Result<(), MeshError>;
    /// Current triangles, counter-clockwise.
    fn simplices(&self) -> Vec<[usize; 3]>;
    /// Number of points handed to the structure so far.
    fn num_points(&self) -> usize;
}

/// Number of internal slots taken by the super-triangle.
const SUPER: usize = 3;
/// Size of the super-triangle relative to the bounding box of the input.
const SUPER_SCALE: f64 = 100.0;

/// Bowyer–Watson triangulation with slot reuse and a directed-edge index.
#[derive(Clone, Debug)]
pub struct BowyerWatson {
    vertices: Vec<Point2>,
    triangles: Vec<Option<[usize; 3]>>,
    free: Vec<usize>,
    /// Directed edge `(a, b)` to the slot of the triangle that owns it.
    edges: HashMap<(usize, usize), usize>,
    /// Slot of the most recently created triangle; point location starts here.
    last: usize,
}

fn super_triangle(points: &[Point2]) -> [Point2; 3] {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let cx = 0.5 * (min_x + max_x);
    let cy = 0.5 * (min_y + max_y);
    let span = (max_x - min_x).max(max_y - min_y);
    let r = SUPER_SCALE * if span > 0.0 { span } else { 1.0 };

    [
        Point2::new(cx - 2.0 * r, cy - r),
        Point2::new(cx + 2.0 * r, cy - r),
        Point2::new(cx, cy + 2.0 * r),
    ]
}

#[inline]
fn tri_edges(t: [usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

impl BowyerWatson {
    fn with_super_triangle(points: &[Point2]) -> Self {
        let mut bw = Self {
            vertices: super_triangle(points).to_vec(),
            triangles: Vec::new(),
            free: Vec::new(),
            edges: HashMap::new(),
            last: 0,
        };
        bw.add_triangle([0, 1, 2]);
        bw
    }

    fn add_triangle(&mut self, t: [usize; 3]) {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.triangles[slot] = Some(t);
                slot
            }
            None => {
                self.triangles.push(Some(t));
                self.triangles.len() - 1
            }
        };
        for edge in tri_edges(t) {
            self.edges.insert(edge, slot);
        }
        self.last = slot;
    }

    fn remove_triangle(&mut self, slot: usize) {
        if let Some(t) = self.triangles[slot].take() {
            for edge in tri_edges(t) {
                self.edges.remove(&edge);
            }
            self.free.push(slot);
        }
    }

    fn contains(&self, t: [usize; 3], p: &Point2) -> bool {
        let [a, b, c] = t.map(|v| &self.vertices[v]);
        orient2d(a, b, p) >= 0.0 && orient2d(b, c, p) >= 0.0 && orient2d(c, a, p) >= 0.0
    }

    fn in_circumcircle(&self, t: [usize; 3], p: &Point2) -> bool {
        let [a, b, c] = t.map(|v| &self.vertices[v]);
        incircle(a, b, c, p) > 0.0
    }

    /// Slot of a triangle containing `p`. Walks from the newest triangle and
    /// falls back to a full scan if the walk leaves the triangulation.
    fn locate(&self, p: &Point2) -> Option<usize> {
        self.walk(p).or_else(|| {
            self.triangles
                .iter()
                .position(|t| matches!(t, Some(t) if self.contains(*t, p)))
        })
    }

    /// Visibility walk: cross any edge that `p` lies strictly to the right of.
    /// Bounded by the slot count so rounding cannot make it cycle.
    fn walk(&self, p: &Point2) -> Option<usize> {
        let mut slot = self.last;
        for _ in 0..self.triangles.len() {
            let t = self.triangles.get(slot).copied().flatten()?;
            let exit = tri_edges(t)
                .into_iter()
                .find(|&(a, b)| orient2d(&self.vertices[a], &self.vertices[b], p) < 0.0);
            match exit {
                None => return Some(slot),
                Some((a, b)) => slot = *self.edges.get(&(b, a))?,
            }
        }
        None
    }

    /// Boundary edges of a cavity, each with the cavity slot that owns it.
    fn cavity_boundary(&self, cavity: &HashSet<usize>) -> Vec<(usize, usize, usize)> {
        let mut boundary = Vec::new();
        for &slot in cavity {
            let Some(t) = self.triangles[slot] else {
                continue;
            };
            for (a, b) in tri_edges(t) {
                let shared = self
                    .edges
                    .get(&(b, a))
                    .is_some_and(|neighbor| cavity.contains(neighbor));
                if !shared {
                    boundary.push((a, b, slot));
                }
            }
        }
        // cavity is a hash set; keep slot creation order reproducible
        boundary.sort_unstable();
        boundary
    }

    fn insert_one(&mut self, p: Point2) {
        let index = self.vertices.len();
        self.vertices.push(p);

        let Some(start) = self.locate(&p) else {
            log::warn!("point {} at {p:?} lies outside the triangulation; ignored", index - SUPER);
            return;
        };
        let start_tri = self.triangles[start].unwrap_or_default();
        if start_tri.iter().any(|&v| self.vertices[v] == p) {
            log::warn!("point {} duplicates an existing vertex; ignored", index - SUPER);
            return;
        }

        // grow the cavity across edges whose neighbor's circumcircle holds p
        let mut cavity = HashSet::new();
        cavity.insert(start);
        let mut stack = vec![start];
        while let Some(slot) = stack.pop() {
            let Some(t) = self.triangles[slot] else {
                continue;
            };
            for (a, b) in tri_edges(t) {
                if let Some(&neighbor) = self.edges.get(&(b, a)) {
                    if cavity.contains(&neighbor) {
                        continue;
                    }
                    if let Some(nt) = self.triangles[neighbor] {
                        if self.in_circumcircle(nt, &p) {
                            cavity.insert(neighbor);
                            stack.push(neighbor);
                        }
                    }
                }
            }
        }

        // rounding can admit a triangle whose outer edge does not face p;
        // shrink until the cavity is star-shaped around p
        let boundary = loop {
            let boundary = self.cavity_boundary(&cavity);
            let hidden = boundary
                .iter()
                .find(|&&(a, b, owner)| {
                    owner != start && orient2d(&self.vertices[a], &self.vertices[b], &p) <= 0.0
                })
                .map(|&(_, _, owner)| owner);
            match hidden {
                Some(owner) => {
                    cavity.remove(&owner);
                }
                None => break boundary,
            }
        };

        let mut slots: Vec<usize> = cavity.into_iter().collect();
        slots.sort_unstable();
        for slot in slots {
            self.remove_triangle(slot);
        }
        for (a, b, _) in boundary {
            self.add_triangle([a, b, index]);
        }
    }
}

impl IncrementalTriangulation for BowyerWatson {
    fn triangulate(points: &[Point2]) -> Result<Self, MeshError> {
        if points.len() < 3 {
            return Err(MeshError::TooFewPoints(points.len()));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFiniteDomainPoint { index });
        }
        let mut bw = Self::with_super_triangle(points);
        for p in points {
            bw.insert_one(*p);
        }
        if bw.simplices().is_empty() {
            return Err(MeshError::DegenerateTriangulation);
        }
        Ok(bw)
    }

    fn insert(&mut self, points: &[Point2]) -> Result<(), MeshError> {
        if let Some(offset) = points.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFiniteDomainPoint {
                index: self.num_points() + offset,
            });
        }
        for p in points {
            self.insert_one(*p);
        }
        Ok(())
    }

    fn simplices(&self) -> Vec<[usize; 3]> {
        self.triangles
            .iter()
            .flatten()
            .filter(|t| t.iter().all(|&v| v >= SUPER))
            .map(|t| t.map(|v| v - SUPER))
            .collect()
    }

    fn num_points(&self) -> usize {
        self.vertices.len() - SUPER
    }
}
