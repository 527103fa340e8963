//! Shared data model for CQL measure calculation
//!
//! This crate defines the types exchanged between the clause indexer,
//! the population value deriver and the relevance engine:
//! - Raw engine values and per-patient raw results
//! - Population codes, population results and episode results
//! - Relevance and final-result verdicts
//! - Statement references and the statement dependency graph
//! - Population sets and their resolution into calculation criteria

pub mod error;
pub mod graph;
pub mod ids;
pub mod population;
pub mod population_set;
pub mod relevance;
pub mod results;
pub mod value;

pub use error::{ModelError, ModelResult};
pub use graph::{StatementDependency, StatementGraph, StatementRef};
pub use ids::{EpisodeId, LocalId};
pub use population::{Bucket, EpisodeResults, PopulationCode, PopulationResult};
pub use population_set::{
    Observation, PopulationCriteria, PopulationSet, PopulationSetKey, Stratification,
};
pub use relevance::{FinalResult, PopulationRelevance, Relevance};
pub use results::{LibraryClauseResults, RawPatientResults};
pub use value::{RawCode, RawInterval, RawValue};
