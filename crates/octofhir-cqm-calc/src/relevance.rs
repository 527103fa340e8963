//! Population and statement relevance
//!
//! A bucket is relevant when evaluating it could have changed the
//! patient's outcome. Statement relevance follows from bucket relevance
//! through the dependency graph.

use std::collections::HashSet;

use indexmap::IndexMap;
use octofhir_cqm_types::{
    Bucket, EpisodeResults, PopulationCode, PopulationCriteria, PopulationRelevance,
    PopulationResult, Relevance, StatementGraph, StatementRef,
};
use serde::Serialize;

use PopulationCode::{
    DenominatorException, DenominatorExclusion, Denominator, InitialPopulation, MeasurePopulation,
    MeasurePopulationExclusion, Numerator, NumeratorExclusion, Stratification,
};

/// Everything that only matters once a patient is in the initial population
const AFTER_INITIAL_POPULATION: [Bucket; 8] = [
    Bucket::Population(Numerator),
    Bucket::Population(NumeratorExclusion),
    Bucket::Population(Denominator),
    Bucket::Population(DenominatorExclusion),
    Bucket::Population(DenominatorException),
    Bucket::Population(MeasurePopulation),
    Bucket::Population(MeasurePopulationExclusion),
    Bucket::Values,
];

// ============================================================================
// Population Relevance
// ============================================================================

/// Relevance of every bucket defined by `result`
pub fn population_relevance(result: &PopulationResult) -> PopulationRelevance {
    let mut relevance = PopulationRelevance::all_relevant(result.buckets());
    let downgrade = |relevance: &mut PopulationRelevance, buckets: &[Bucket]| {
        for bucket in buckets {
            relevance.downgrade(*bucket);
        }
    };

    if result.is_zero(Stratification) {
        relevance.downgrade(InitialPopulation);
        downgrade(&mut relevance, &AFTER_INITIAL_POPULATION);
    }
    if result.is_zero(InitialPopulation) {
        downgrade(&mut relevance, &AFTER_INITIAL_POPULATION);
    }
    if result.is_zero(Denominator) {
        downgrade(
            &mut relevance,
            &[
                Numerator.into(),
                NumeratorExclusion.into(),
                DenominatorExclusion.into(),
                DenominatorException.into(),
            ],
        );
    }
    if at_least(result, DenominatorExclusion, Denominator) {
        downgrade(
            &mut relevance,
            &[
                Numerator.into(),
                NumeratorExclusion.into(),
                DenominatorException.into(),
            ],
        );
    }
    if result.is_zero(Numerator) {
        relevance.downgrade(NumeratorExclusion);
    }
    if result.is_positive(Numerator) {
        relevance.downgrade(DenominatorException);
    }
    if result.is_zero(MeasurePopulation) {
        downgrade(
            &mut relevance,
            &[Bucket::Values, MeasurePopulationExclusion.into()],
        );
    }
    if at_least(result, MeasurePopulationExclusion, MeasurePopulation) {
        relevance.downgrade(Bucket::Values);
    }
    relevance
}

/// `left >= right`, both buckets defined
fn at_least(result: &PopulationResult, left: PopulationCode, right: PopulationCode) -> bool {
    match (result.get(left), result.get(right)) {
        (Some(left), Some(right)) => left >= right,
        _ => false,
    }
}

/// Bucket-wise OR of every episode's relevance; the patient-level
/// relevance when there are no episodes.
pub fn episode_relevance(episodes: &EpisodeResults, patient: &PopulationResult) -> PopulationRelevance {
    if episodes.is_empty() {
        return population_relevance(patient);
    }
    let mut relevance = PopulationRelevance::default();
    for episode in episodes.values() {
        relevance.merge_or(&population_relevance(episode));
    }
    relevance
}

// ============================================================================
// Statement Relevance
// ============================================================================

/// Relevance per library statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatementRelevanceMap(IndexMap<String, IndexMap<String, Relevance>>);

impl StatementRelevanceMap {
    /// Every statement of the graph, not applicable
    pub fn seeded(graph: &StatementGraph) -> Self {
        let mut map = IndexMap::new();
        for library in graph.libraries() {
            let statements = graph
                .library_statements(library)
                .map(|statement| (statement.to_string(), Relevance::NotApplicable))
                .collect();
            map.insert(library.to_string(), statements);
        }
        Self(map)
    }

    /// Relevance of a statement; statements outside the graph are not
    /// applicable
    pub fn get(&self, statement: &StatementRef) -> Relevance {
        self.0
            .get(&statement.library)
            .and_then(|statements| statements.get(&statement.statement))
            .copied()
            .unwrap_or_default()
    }

    fn get_mut(&mut self, statement: &StatementRef) -> Option<&mut Relevance> {
        self.0
            .get_mut(&statement.library)?
            .get_mut(&statement.statement)
    }

    pub fn library(&self, name: &str) -> Option<&IndexMap<String, Relevance>> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatementRef, Relevance)> + '_ {
        self.0.iter().flat_map(|(library, statements)| {
            statements.iter().map(move |(statement, relevance)| {
                (StatementRef::new(library.as_str(), statement.as_str()), *relevance)
            })
        })
    }

    /// Mark `root` and everything it depends on.
    ///
    /// A statement already TRUE is left alone and its dependencies are not
    /// revisited. Statements missing from the graph end the walk on that
    /// edge.
    pub fn mark(&mut self, graph: &StatementGraph, root: &StatementRef, relevant: bool) {
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(statement) = stack.pop() {
            if !visited.insert(statement) {
                continue;
            }
            let Some(state) = self.get_mut(statement) else {
                log::debug!("{} is not in the dependency graph", statement);
                continue;
            };
            if !state.mark(relevant) {
                continue;
            }
            log::trace!("{} marked {}", statement, state);
            if let Some(references) = graph.references(statement) {
                stack.extend(references.iter().rev());
            }
        }
    }
}

/// Propagate bucket relevance to statements.
///
/// With `calculate_sdes`, supplemental data element statements are marked
/// relevant as well.
pub fn statement_relevance(
    relevance: &PopulationRelevance,
    graph: &StatementGraph,
    criteria: &PopulationCriteria,
    calculate_sdes: bool,
) -> StatementRelevanceMap {
    let mut map = StatementRelevanceMap::seeded(graph);

    if calculate_sdes {
        for statement in &criteria.supplemental_data_elements {
            map.mark(graph, statement, true);
        }
    }

    for (bucket, relevant) in relevance.iter() {
        match bucket {
            Bucket::Values => {
                for observation in &criteria.observations {
                    map.mark(graph, observation, relevant);
                }
            }
            Bucket::Population(code) => match criteria.statement(code) {
                Some(statement) => map.mark(graph, statement, relevant),
                None => log::debug!("No statement for population {}", code),
            },
        }
    }
    map
}
