#![cfg_attr(docsrs, feature(doc_cfg))]
//! # flux-mesh
//!
//! flux-mesh samples a 2D mapping `f: domain -> image` (typically a raytrace
//! from pupil coordinates to an image plane) on an adaptive triangular mesh and
//! transports flux through it. The mapping may be discontinuous (vignetting,
//! aperture edges) or undefined (rays that never arrive); the mesh locates
//! those places and refines around them while conserving domain area.
//!
//! ## Features
//! - Incremental Delaunay construction with centroid refinement of large triangles
//! - Five-way, area-preserving splitting of triangles cut by a discontinuity
//! - Trimming of triangles that touch undefined image points
//! - A transmission driver that refines one mesh per parameter sample and
//!   accumulates the result on pluggable detectors (cartesian, polar, and a
//!   triangulation completeness check)
//! - Optional parallel driver (`parallel` feature, rayon + parking_lot)
//! - Invariant checking in debug builds or with the `strict-invariants` feature
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! flux-mesh = "0.1"
//! # features = ["parallel"]
//! ```
//!
//! ```rust
//! use flux_mesh::prelude::*;
//!
//! let square = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! // identity with a jump at x = 0.5
//! let jump = |pts: &[Point2]| -> Vec<Point2> {
//!     pts.iter()
//!         .map(|p| if p.x > 0.5 { Point2::new(p.x + 10.0, p.y) } else { *p })
//!         .collect()
//! };
//! let mut mesh = AdaptiveMesh::new(&square, jump)?;
//! let added = mesh.refine_broken_triangles(|view: &MeshView<'_>| {
//!     view.broken_triangles(view.simplices, Some(5.0))
//! }, 10)?;
//! assert_eq!(added, 10);
//! assert!(!mesh.is_delaunay());
//! # Ok::<(), MeshError>(())
//! ```

pub mod debug_invariants;
pub mod detectors;
pub mod geometry;
pub mod mapping;
pub mod mesh;
pub mod mesh_error;
pub mod transmission;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::detectors::{
        CheckTriangulationDetector, Detector, PolarImageDetector, RectImageDetector,
    };
    pub use crate::geometry::delaunay::{BowyerWatson, IncrementalTriangulation};
    pub use crate::geometry::point::Point2;
    pub use crate::mapping::Mapping;
    pub use crate::mesh::classify::{broken_above_area, domain_area_above};
    pub use crate::mesh::snapshot::MeshSnapshot;
    pub use crate::mesh::{AdaptiveMesh, MeshView};
    pub use crate::mesh_error::MeshError;
    pub use crate::transmission::{
        ParameterReport, Transmission, TransmissionOptions, TransmissionReport,
    };
}
