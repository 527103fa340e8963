//! Measure definitions
//!
//! A measure as the calculation sees it: compiled libraries, population
//! sets, and the calculation basis. Loaded from the JSON shape measure
//! authoring tools export (`main_cql_library`, `cql_libraries`,
//! `population_sets`, ...).

use octofhir_cqm_elm::{ElmLibrary, add_library};
use octofhir_cqm_types::{
    PopulationCriteria, PopulationSet, PopulationSetKey, StatementDependency, StatementGraph,
    StatementRef,
};
use serde::{Deserialize, Serialize};

use crate::error::{CalcResult, CalculationError};

/// Unit a measure counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasureBasis {
    /// One result per patient
    #[default]
    #[serde(rename = "PATIENT")]
    Patient,
    /// One result per episode of care, summed per patient
    #[serde(rename = "EPISODE_OF_CARE")]
    EpisodeOfCare,
}

/// A compiled library of a measure
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureLibrary {
    pub library_name: String,
    pub elm: ElmLibrary,
    /// Dependency entries exported with the measure; derived from the
    /// ELM when absent
    #[serde(default)]
    pub statement_dependencies: Option<Vec<StatementDependency>>,
}

/// A quality measure
#[derive(Debug, Clone, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub main_cql_library: String,
    #[serde(default)]
    pub calculation_method: MeasureBasis,
    #[serde(default)]
    pub calculate_sdes: bool,
    pub population_sets: Vec<PopulationSet>,
    pub cql_libraries: Vec<MeasureLibrary>,
}

impl Measure {
    /// Load and validate a measure from a JSON string
    pub fn from_json_str(input: &str) -> CalcResult<Self> {
        let measure: Self = serde_json::from_str(input)?;
        measure.validate()?;
        Ok(measure)
    }

    /// Load and validate a measure from a JSON value
    pub fn from_json(document: serde_json::Value) -> CalcResult<Self> {
        let measure: Self = serde_json::from_value(document)?;
        measure.validate()?;
        Ok(measure)
    }

    /// Check that the main library is listed and that every library's name
    /// matches its ELM identifier. Dependency graphs and verdicts are
    /// keyed by that one name.
    pub fn validate(&self) -> CalcResult<()> {
        self.main_library()?;
        for library in &self.cql_libraries {
            if library.library_name != library.elm.id() {
                return Err(CalculationError::library_mismatch(
                    library.library_name.as_str(),
                    library.elm.id(),
                ));
            }
        }
        Ok(())
    }

    pub fn is_episode_of_care(&self) -> bool {
        self.calculation_method == MeasureBasis::EpisodeOfCare
    }

    pub fn library(&self, name: &str) -> Option<&MeasureLibrary> {
        self.cql_libraries
            .iter()
            .find(|library| library.library_name == name)
    }

    pub fn main_library(&self) -> CalcResult<&MeasureLibrary> {
        self.library(&self.main_cql_library)
            .ok_or_else(|| CalculationError::library_not_found(&self.main_cql_library))
    }

    /// ELM of every library, in definition order
    pub fn elm_libraries(&self) -> impl Iterator<Item = &ElmLibrary> {
        self.cql_libraries.iter().map(|library| &library.elm)
    }

    /// Resolve a population set key into calculation criteria
    pub fn criteria(&self, key: PopulationSetKey) -> CalcResult<PopulationCriteria> {
        let population_set = key
            .index()
            .and_then(|index| self.population_sets.get(index))
            .ok_or_else(|| CalculationError::unknown_population_set(key))?;
        Ok(population_set.criteria(key.stratification)?)
    }

    /// Every population set key, stratifications following their
    /// population set
    pub fn population_set_keys(&self) -> Vec<PopulationSetKey> {
        let mut keys = Vec::new();
        for (index, population_set) in self.population_sets.iter().enumerate() {
            let ordinal = index + 1;
            keys.push(PopulationSetKey::new(ordinal));
            for stratification in 1..=population_set.stratification_count() {
                keys.push(PopulationSetKey::stratified(ordinal, stratification));
            }
        }
        keys
    }

    /// Statement dependency graph over every library.
    ///
    /// Exported dependency entries are used as given; libraries without
    /// them are read from their ELM.
    pub fn dependency_graph(&self) -> StatementGraph {
        let mut graph = StatementGraph::new();
        for library in &self.cql_libraries {
            match &library.statement_dependencies {
                Some(dependencies) => {
                    for dependency in dependencies {
                        let from = StatementRef::new(
                            library.library_name.as_str(),
                            dependency.statement_name.as_str(),
                        );
                        graph.add_statement(&from);
                        for reference in &dependency.statement_references {
                            graph.add_reference(&from, reference.clone());
                        }
                    }
                }
                None => add_library(&mut graph, &library.elm),
            }
        }
        graph
    }
}
