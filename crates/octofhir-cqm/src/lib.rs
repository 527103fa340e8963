//! CQL measure population calculation and clause coverage
//!
//! This crate bundles the cqm crates behind one dependency:
//! - [`types`]: raw engine values, population results, relevance verdicts
//! - [`elm`]: ELM libraries, clause indexing and statement dependencies
//! - [`calc`]: population derivation, relevance and clause attribution
//!
//! # Example
//!
//! ```no_run
//! use octofhir_cqm::{CalculationOptions, Calculator, Measure, RawPatientResults};
//!
//! # fn run(measure_json: &str, patient: RawPatientResults) -> Result<(), Box<dyn std::error::Error>> {
//! let measure = Measure::from_json_str(measure_json)?;
//! let calculator = Calculator::new(measure, CalculationOptions::default());
//! for (key, result) in calculator.calculate_all(&patient)? {
//!     println!("{key}: {}", serde_json::to_string(&result.population)?);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_cqm_calc as calc;
pub use octofhir_cqm_elm as elm;
pub use octofhir_cqm_types as types;

// Convenience re-exports
pub use octofhir_cqm_calc::{
    CalcResult, CalculationError, CalculationOptions, Calculator, Measure, PatientResults,
    PopulationSetResult,
};
pub use octofhir_cqm_elm::{ClauseIndexer, ClauseMap, ElmLibrary};
pub use octofhir_cqm_types::{
    FinalResult, PopulationCode, PopulationResult, PopulationSetKey, RawPatientResults, RawValue,
    Relevance,
};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
