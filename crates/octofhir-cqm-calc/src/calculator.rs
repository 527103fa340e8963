//! Calculator facade
//!
//! Runs the whole pipeline for a patient: population values, relevance,
//! statement verdicts and, on request, clause verdicts.

use indexmap::IndexMap;
use octofhir_cqm_elm::ClauseIndexer;
use octofhir_cqm_types::{
    EpisodeResults, PopulationRelevance, PopulationResult, PopulationSetKey, RawPatientResults,
    StatementGraph, StatementRef,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::attribution::{ClauseResults, StatementResults, clause_results, statement_results};
use crate::cache::ClauseIndexCache;
use crate::error::CalcResult;
use crate::measure::Measure;
use crate::options::CalculationOptions;
use crate::relevance::{
    StatementRelevanceMap, episode_relevance, population_relevance, statement_relevance,
};
use crate::values::derive_population_values;

/// Everything calculated for one patient and one population set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationSetResult {
    #[serde(flatten)]
    pub population: PopulationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_results: Option<EpisodeResults>,
    pub population_relevance: PopulationRelevance,
    pub statement_relevance: StatementRelevanceMap,
    pub statement_results: StatementResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause_results: Option<ClauseResults>,
}

/// Results of one patient, per population set key
pub type PatientResults = IndexMap<PopulationSetKey, PopulationSetResult>;

/// Calculates patients against one measure
#[derive(Debug)]
pub struct Calculator {
    measure: Measure,
    options: CalculationOptions,
    graph: StatementGraph,
    cache: ClauseIndexCache,
}

impl Calculator {
    /// Create a new calculator for `measure`
    pub fn new(measure: Measure, options: CalculationOptions) -> Self {
        let graph = measure.dependency_graph();
        let cache = ClauseIndexCache::new(ClauseIndexer::with_offsets(options.offsets));
        log::debug!(
            "Calculator for {}: {} population sets, {} statements in graph",
            measure.main_cql_library,
            measure.population_sets.len(),
            graph.len()
        );
        Self {
            measure,
            options,
            graph,
            cache,
        }
    }

    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    pub fn options(&self) -> &CalculationOptions {
        &self.options
    }

    pub fn graph(&self) -> &StatementGraph {
        &self.graph
    }

    /// Calculate one population set (or stratification) for a patient
    pub fn calculate(
        &self,
        patient: &RawPatientResults,
        key: PopulationSetKey,
    ) -> CalcResult<PopulationSetResult> {
        let criteria = self.measure.criteria(key)?;
        let derived = derive_population_values(
            &criteria,
            &patient.statements,
            self.measure.calculation_method,
        );

        let population_relevance = match &derived.episodes {
            Some(episodes) => episode_relevance(episodes, &derived.population),
            None => population_relevance(&derived.population),
        };
        let calculate_sdes = self.options.calculate_sdes(self.measure.calculate_sdes);
        let statement_relevance =
            statement_relevance(&population_relevance, &self.graph, &criteria, calculate_sdes);
        let statement_results = statement_results(
            self.measure.elm_libraries(),
            patient,
            &statement_relevance,
            &criteria.supplemental_data_elements,
            calculate_sdes,
        );
        let clause_results = self
            .options
            .include_clause_results
            .then(|| self.clause_results(patient, &statement_relevance));

        log::debug!("{}: {:?}", key, derived.population);
        Ok(PopulationSetResult {
            population: derived.population,
            episode_results: derived.episodes,
            population_relevance,
            statement_relevance,
            statement_results,
            clause_results,
        })
    }

    fn clause_results(
        &self,
        patient: &RawPatientResults,
        relevance: &StatementRelevanceMap,
    ) -> ClauseResults {
        self.measure
            .elm_libraries()
            .map(|library| {
                let statements = library
                    .statements()
                    .iter()
                    .map(|statement| {
                        let clauses = self.cache.clauses(library, statement);
                        let reference = StatementRef::new(library.id(), statement.name.as_str());
                        let results =
                            clause_results(library.id(), &clauses, patient, relevance.get(&reference));
                        (statement.name.clone(), results)
                    })
                    .collect();
                (library.id().to_string(), statements)
            })
            .collect()
    }

    /// Calculate every population set and stratification for a patient
    pub fn calculate_all(&self, patient: &RawPatientResults) -> CalcResult<PatientResults> {
        self.measure
            .population_set_keys()
            .into_iter()
            .map(|key| Ok((key, self.calculate(patient, key)?)))
            .collect()
    }

    /// Calculate many patients in parallel. Results keep the input order.
    pub fn calculate_patients(
        &self,
        patients: &IndexMap<String, RawPatientResults>,
    ) -> CalcResult<IndexMap<String, PatientResults>> {
        let patients: Vec<_> = patients.iter().collect();
        let results = patients
            .par_iter()
            .map(|(id, patient)| Ok(((*id).clone(), self.calculate_all(patient)?)))
            .collect::<CalcResult<Vec<_>>>()?;
        Ok(results.into_iter().collect())
    }
}
