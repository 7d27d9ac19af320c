//! MeshError: Unified error type for flux-mesh public APIs
//!
//! Every fallible operation in the crate returns this type. Errors fall into
//! three groups: configuration errors (bad inputs, reported at construction or
//! at the call that received them), state errors (an operation that is no
//! longer legal for the mesh), and invariant violations (a geometry bug; the
//! failing call commits nothing and the caller must not retry).

use thiserror::Error;

/// Unified error type for flux-mesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Fewer than three initial points were supplied.
    #[error("configuration error: at least 3 initial points are required, got {0}")]
    TooFewPoints(usize),
    /// A flat coordinate buffer does not describe an N×2 array.
    #[error("configuration error: flat coordinate buffer of length {0} is not N×2")]
    OddCoordinateBuffer(usize),
    /// An initial domain point has a NaN or infinite coordinate.
    #[error("configuration error: initial domain point {index} is not finite")]
    NonFiniteDomainPoint { index: usize },
    /// The mapping returned a different number of image points than requested.
    #[error(
        "configuration error: mapping returned {found} image points for {expected} domain points"
    )]
    MappingShapeMismatch { expected: usize, found: usize },
    /// The initial points are collinear or coincident; no triangle could be built.
    #[error("configuration error: initial points do not span a triangle")]
    DegenerateTriangulation,
    /// Edge resampling needs both endpoints.
    #[error("configuration error: n_divide must be at least 2, got {0}")]
    InvalidDivisionCount(usize),
    /// A classification mask does not line up with the simplices it classifies.
    #[error("configuration error: mask has length {found}, expected {expected}")]
    MaskLengthMismatch { expected: usize, found: usize },
    /// Parameter and weight lists disagree in length.
    #[error("configuration error: {parameters} parameters but {weights} weights")]
    WeightCountMismatch { parameters: usize, weights: usize },
    /// A detector was configured with an unusable geometry.
    #[error("configuration error: invalid detector: {0}")]
    InvalidDetector(String),
    /// The requested operation is not legal in the mesh's current state.
    #[error("illegal operation in current state: {0}")]
    IllegalState(&'static str),
    /// A simplex refers to a point that does not exist.
    #[error(
        "invariant violated: simplex {simplex} references point {index}, \
         but only {len} points exist"
    )]
    SimplexIndexOutOfBounds {
        simplex: usize,
        index: usize,
        len: usize,
    },
    /// `domain_points` and `image_points` drifted apart.
    #[error("invariant violated: {domain} domain points but {image} image points")]
    PointCountMismatch { domain: usize, image: usize },
    /// A triangle that survived degenerate filtering is not counter-clockwise.
    #[error("invariant violated: triangle {triangle} has non-positive domain area {area:e}")]
    NonPositiveArea { triangle: usize, area: f64 },
    /// The replacement triangles do not cover the replaced area.
    #[error("invariant violated: replaced area {old:e} but new triangles cover {new:e}")]
    AreaNotConserved { old: f64, new: f64 },
    /// The subdivision of a single broken triangle does not tile it.
    #[error(
        "invariant violated: subdivision of triangle {triangle} covers {found:e} \
         instead of {expected:e}"
    )]
    PartitionMismatch {
        triangle: usize,
        expected: f64,
        found: f64,
    },
}

impl MeshError {
    /// True for geometry/algorithm bugs that must never be retried.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            MeshError::SimplexIndexOutOfBounds { .. }
                | MeshError::PointCountMismatch { .. }
                | MeshError::NonPositiveArea { .. }
                | MeshError::AreaNotConserved { .. }
                | MeshError::PartitionMismatch { .. }
        )
    }

    /// True for errors caused by the inputs handed to the crate.
    pub fn is_configuration_error(&self) -> bool {
        !self.is_invariant_violation() && !matches!(self, MeshError::IllegalState(_))
    }
}
