//! Error types for the measurement engine.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors raised by the measurement engine.
///
/// Table lifecycle violations and lookup misses surface immediately; errors
/// raised during a measurement run propagate out of
/// [`MeasurementTool::measure`](crate::MeasurementTool::measure) unchanged
/// after per-feature cleanup has run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// Bad caller parameters: empty names, mismatched sizes, nonsense
    /// connectivity, zero-sized tables.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Schema mutation attempted on a forged table.
    #[error("measurement table is already forged")]
    AlreadyForged,

    /// Data access attempted on a table that has not been forged.
    #[error("measurement table is not forged")]
    NotForged,

    /// A feature with this name is already present in the table.
    #[error("feature already present: {name}")]
    DuplicateFeature { name: String },

    /// This object identifier is already present in the table.
    #[error("object already present: {id}")]
    DuplicateObject { id: u32 },

    /// No feature with this name is registered or present.
    #[error("feature not known: {name}")]
    UnknownFeature { name: String },

    /// No row for this object identifier.
    #[error("object not present: {id}")]
    UnknownObject { id: u32 },

    /// A feature rejected the input images during initialization.
    #[error("unsupported input for feature {feature}: {reason}")]
    UnsupportedInput { feature: String, reason: String },

    /// Composite feature dependencies form a cycle.
    #[error("cyclic feature dependency involving: {name}")]
    CyclicDependency { name: String },
}

impl MeasureError {
    /// Shorthand for an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::InvalidArgument(details.into())
    }

    /// Shorthand for an [`UnsupportedInput`](Self::UnsupportedInput) error.
    pub fn unsupported(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedInput {
            feature: feature.into(),
            reason: reason.into(),
        }
    }
}
