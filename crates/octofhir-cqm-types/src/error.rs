//! Errors raised while interpreting measure definitions

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while resolving measure definition data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Unrecognised population code
    #[error("Unknown population code: {code}")]
    UnknownPopulationCode { code: String },

    /// Population set key does not follow `PopulationSet_<n>[_Stratification_<m>]`
    #[error("Invalid population set key: {key}")]
    InvalidPopulationSetKey { key: String },

    /// Stratification ordinal not defined on the population set
    #[error("Population set {population_set} has no stratification {stratification}")]
    UnknownStratification {
        population_set: String,
        stratification: usize,
    },
}

impl ModelError {
    /// Create an unknown population code error
    pub fn unknown_population_code(code: impl Into<String>) -> Self {
        Self::UnknownPopulationCode { code: code.into() }
    }

    /// Create an invalid population set key error
    pub fn invalid_population_set_key(key: impl Into<String>) -> Self {
        Self::InvalidPopulationSetKey { key: key.into() }
    }

    /// Create an unknown stratification error
    pub fn unknown_stratification(population_set: impl Into<String>, stratification: usize) -> Self {
        Self::UnknownStratification {
            population_set: population_set.into(),
            stratification,
        }
    }
}
