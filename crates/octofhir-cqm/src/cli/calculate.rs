//! Calculate command implementation

use super::output::{self, OutputFormat};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use octofhir_cqm_calc::{CalculationOptions, Calculator, Measure};
use octofhir_cqm_types::{PopulationSetKey, RawPatientResults};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for calculate command
pub struct CalculateConfig {
    pub measure: PathBuf,
    pub results: PathBuf,
    pub population_set: Option<String>,
    pub clauses: bool,
    pub calculate_sdes: Option<bool>,
    pub verbose: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Raw engine results as found in a results file
#[derive(Debug, Clone, PartialEq)]
pub enum PatientBatch {
    /// The file holds one patient's `statements` / `clauses`
    Single(RawPatientResults),
    /// The file maps patient ids to their results
    Many(IndexMap<String, RawPatientResults>),
}

impl PatientBatch {
    /// Interpret a results document
    pub fn from_json(document: Value) -> Result<Self> {
        let single = document
            .as_object()
            .is_some_and(|map| map.contains_key("statements") || map.contains_key("clauses"));
        if single {
            let patient = serde_json::from_value(document).context("Invalid patient results")?;
            Ok(Self::Single(patient))
        } else {
            let patients =
                serde_json::from_value(document).context("Invalid patient results map")?;
            Ok(Self::Many(patients))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(patients) => patients.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load a measure definition
pub fn load_measure(path: &Path) -> Result<Measure> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read measure file: {}", path.display()))?;
    Measure::from_json_str(&content)
        .with_context(|| format!("Failed to load measure: {}", path.display()))
}

/// Load raw engine results
pub fn load_results(path: &Path) -> Result<PatientBatch> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file: {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse results file: {}", path.display()))?;
    PatientBatch::from_json(document)
        .with_context(|| format!("Failed to load results: {}", path.display()))
}

/// Calculate and serialize, without writing anything
pub fn run(
    calculator: &Calculator,
    batch: &PatientBatch,
    key: Option<PopulationSetKey>,
) -> Result<Value> {
    let value = match (batch, key) {
        (PatientBatch::Single(patient), Some(key)) => {
            serde_json::to_value(calculator.calculate(patient, key)?)?
        }
        (PatientBatch::Single(patient), None) => {
            serde_json::to_value(calculator.calculate_all(patient)?)?
        }
        (PatientBatch::Many(patients), Some(key)) => {
            let results = patients
                .iter()
                .map(|(id, patient)| Ok((id.clone(), calculator.calculate(patient, key)?)))
                .collect::<Result<IndexMap<_, _>>>()?;
            serde_json::to_value(results)?
        }
        (PatientBatch::Many(patients), None) => {
            serde_json::to_value(calculator.calculate_patients(patients)?)?
        }
    };
    Ok(value)
}

/// Calculate measure results for the patients in a results file
pub fn calculate(config: CalculateConfig) -> Result<()> {
    let measure = load_measure(&config.measure)?;
    let batch = load_results(&config.results)?;

    let key = config
        .population_set
        .as_deref()
        .map(str::parse::<PopulationSetKey>)
        .transpose()
        .context("Invalid population set key")?;

    if config.verbose {
        eprintln!(
            "Calculating {} patient(s) against {}",
            batch.len(),
            measure.main_cql_library
        );
    }

    let mut options = CalculationOptions::new().with_clause_results(config.clauses);
    if let Some(calculate_sdes) = config.calculate_sdes {
        options = options.with_calculate_sdes(calculate_sdes);
    }
    let calculator = Calculator::new(measure, options);

    let value = run(&calculator, &batch, key)?;
    output::print_output(&value, config.output_format, config.output_file.as_deref())
}
