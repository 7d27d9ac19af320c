//! Planar geometry for the adaptive mesh.
//!
//! Points and the undefined sentinel, exact-formula predicates, and the
//! incremental Delaunay structure backing the initial triangulation.

pub mod delaunay;
pub mod point;
pub mod predicates;
