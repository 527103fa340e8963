//! Calculation errors
//!
//! Data irregularities in engine output never surface here; they resolve
//! to zero counts, stopped propagation or UNHIT verdicts. What remains are
//! requests that do not match the measure.

use octofhir_cqm_types::ModelError;
use thiserror::Error;

/// Result type for calculation operations
pub type CalcResult<T> = Result<T, CalculationError>;

/// Errors that can occur when a calculation request does not fit the measure
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Population set index beyond the measure's population sets
    #[error("Unknown population set: {key}")]
    UnknownPopulationSet { key: String },

    /// Library not listed by the measure
    #[error("Library not found: {name}")]
    LibraryNotFound { name: String },

    /// Measure library whose name differs from its ELM identifier
    #[error("Library '{name}' holds ELM for '{elm_id}'")]
    LibraryMismatch { name: String, elm_id: String },

    /// Measure definition data error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Malformed measure document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalculationError {
    /// Create an unknown population set error
    pub fn unknown_population_set(key: impl ToString) -> Self {
        Self::UnknownPopulationSet {
            key: key.to_string(),
        }
    }

    /// Create a library not found error
    pub fn library_not_found(name: impl Into<String>) -> Self {
        Self::LibraryNotFound { name: name.into() }
    }

    /// Create a library mismatch error
    pub fn library_mismatch(name: impl Into<String>, elm_id: impl Into<String>) -> Self {
        Self::LibraryMismatch {
            name: name.into(),
            elm_id: elm_id.into(),
        }
    }
}
