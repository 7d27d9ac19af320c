//! Owned, serializable copy of a mesh for external plotting or inspection.
//!
//! Undefined image points are stored as `None` so the snapshot survives
//! formats without NaN (JSON writes NaN as `null`).

use crate::geometry::point::Point2;
use crate::mesh::{AdaptiveMesh, MeshView};
use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

const SNAPSHOT_VERSION: u32 = 1;

/// Mesh state at one point in time plus a per-triangle skip mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    /// Snapshot format version.
    pub version: u32,
    pub domain: Vec<Point2>,
    /// Image of each domain point, `None` where the mapping was undefined.
    pub image: Vec<Option<Point2>>,
    pub simplices: Vec<[usize; 3]>,
    /// Triangles excluded from accumulation (typically the broken ones).
    pub skip: Vec<bool>,
    /// Whether the triangle list was still Delaunay.
    pub delaunay: bool,
}

impl MeshSnapshot {
    /// Image points with `None` turned back into [`Point2::UNDEFINED`].
    pub fn image_points(&self) -> Vec<Point2> {
        self.image
            .iter()
            .map(|p| p.unwrap_or(Point2::UNDEFINED))
            .collect()
    }

    /// Triangles not flagged in `skip`.
    pub fn kept_simplices(&self) -> impl Iterator<Item = &[usize; 3]> + '_ {
        self.simplices
            .iter()
            .zip(&self.skip)
            .filter_map(|(t, &s)| (!s).then_some(t))
    }
}

impl<'a> MeshView<'a> {
    /// Copy the view into a snapshot.
    pub fn snapshot(&self, skip: &[bool], delaunay: bool) -> Result<MeshSnapshot, MeshError> {
        if skip.len() != self.simplices.len() {
            return Err(MeshError::MaskLengthMismatch {
                expected: self.simplices.len(),
                found: skip.len(),
            });
        }
        Ok(MeshSnapshot {
            version: SNAPSHOT_VERSION,
            domain: self.domain.to_vec(),
            image: self
                .image
                .iter()
                .map(|p| p.is_defined().then_some(*p))
                .collect(),
            simplices: self.simplices.to_vec(),
            skip: skip.to_vec(),
            delaunay,
        })
    }
}

impl<M, T> AdaptiveMesh<M, T> {
    /// Snapshot of the current mesh; `skip` must match the triangle count.
    pub fn snapshot(&self, skip: &[bool]) -> Result<MeshSnapshot, MeshError> {
        self.view().snapshot(skip, self.is_delaunay())
    }
}
