//! Measure population calculation and clause coverage
//!
//! Given a measure and the raw results a CQL engine produced for a patient,
//! this crate derives:
//! - population membership, per patient or per episode of care
//! - which populations and statements were relevant to the outcome
//! - NA / UNHIT / TRUE / FALSE verdicts per statement and per clause
//!
//! # Example
//!
//! ```no_run
//! use octofhir_cqm_calc::{CalculationOptions, Calculator, Measure};
//! use octofhir_cqm_types::{PopulationSetKey, RawPatientResults};
//!
//! # fn run(measure_json: &str, patient: RawPatientResults) -> Result<(), Box<dyn std::error::Error>> {
//! let measure = Measure::from_json_str(measure_json)?;
//! let calculator = Calculator::new(measure, CalculationOptions::new().with_clause_results(true));
//! let result = calculator.calculate(&patient, PopulationSetKey::new(1))?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod attribution;
pub mod cache;
pub mod calculator;
pub mod error;
pub mod measure;
pub mod options;
pub mod policy;
pub mod relevance;
pub mod values;

pub use attribution::{
    ClauseResult, ClauseResults, StatementResult, StatementResults, clause_results, clause_verdict,
    statement_results, statement_verdict,
};
pub use cache::ClauseIndexCache;
pub use calculator::{Calculator, PatientResults, PopulationSetResult};
pub use error::{CalcResult, CalculationError};
pub use measure::{Measure, MeasureBasis, MeasureLibrary};
pub use options::CalculationOptions;
pub use policy::apply_population_rules;
pub use relevance::{
    StatementRelevanceMap, episode_relevance, population_relevance, statement_relevance,
};
pub use values::{
    DerivedPopulations, derive_population_values, episode_population_values,
    patient_population_values,
};
