//! Error types for town generation

use thiserror::Error;

/// Errors that can occur during town generation or queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TownError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Three triangulation vertices are collinear, so no circumcenter exists
    #[error("degenerate triangle: {a:?}, {b:?}, {c:?} are collinear")]
    DegenerateTriangle {
        a: [f64; 2],
        b: [f64; 2],
        c: [f64; 2],
    },

    /// The cavity left by a point insertion does not form a closed loop
    #[error("broken triangulation boundary while inserting ({x}, {y})")]
    BrokenBoundary { x: f64, y: f64 },

    /// A pipeline stage produced an unusable layout
    #[error("layout rejected: {0}")]
    LayoutRejected(String),

    /// Every generation attempt produced a rejected layout
    #[error("generation failed after {attempts} attempts: {reason}")]
    GenerationFailed { attempts: usize, reason: String },
}

impl TownError {
    /// Whether another attempt with the continuing random stream may succeed
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TownError::LayoutRejected(_))
    }

    pub(crate) fn rejected(reason: impl Into<String>) -> Self {
        TownError::LayoutRejected(reason.into())
    }
}

/// Result type alias for town operations
pub type Result<T> = std::result::Result<T, TownError>;
