//! Properties of relevance propagation and clause verdicts

use octofhir_cqm_calc::{
    clause_results, episode_relevance, population_relevance, statement_relevance,
};
use octofhir_cqm_elm::{Clause, ClauseMap};
use octofhir_cqm_types::{
    EpisodeResults, LocalId, PopulationCode, PopulationCriteria, PopulationRelevance,
    PopulationResult, RawPatientResults, RawValue, Relevance, StatementGraph, StatementRef,
};
use proptest::prelude::*;

const NODES: usize = 8;

const ROOTS: [PopulationCode; 4] = [
    PopulationCode::InitialPopulation,
    PopulationCode::Denominator,
    PopulationCode::Numerator,
    PopulationCode::NumeratorExclusion,
];

fn node(index: usize) -> StatementRef {
    StatementRef::new("Main", format!("S{index}"))
}

fn graph(edges: &[(usize, usize)]) -> StatementGraph {
    let mut graph = StatementGraph::new();
    for index in 0..NODES {
        graph.add_statement(&node(index));
    }
    for (from, to) in edges {
        graph.add_reference(&node(*from), node(*to));
    }
    graph
}

fn criteria() -> PopulationCriteria {
    PopulationCriteria {
        populations: ROOTS
            .iter()
            .enumerate()
            .map(|(index, code)| (*code, node(index)))
            .collect(),
        ..PopulationCriteria::default()
    }
}

fn population_result() -> impl Strategy<Value = PopulationResult> {
    prop::collection::vec(0u32..3, PopulationCode::ALL.len()).prop_map(|counts| {
        PopulationCode::ALL
            .into_iter()
            .zip(counts)
            .fold(PopulationResult::new(), |result, (code, count)| {
                result.with_count(code, count)
            })
    })
}

proptest! {
    #[test]
    fn prop_true_statements_have_true_dependencies(
        edges in prop::collection::vec((0..NODES, 0..NODES), 0..16),
        flags in prop::collection::vec(any::<bool>(), ROOTS.len()),
    ) {
        let graph = graph(&edges);
        let mut relevance = PopulationRelevance::default();
        for (code, relevant) in ROOTS.iter().zip(&flags) {
            relevance.set(*code, *relevant);
        }
        let map = statement_relevance(&relevance, &graph, &criteria(), false);

        let mut reachable = std::collections::HashSet::new();
        for index in 0..ROOTS.len() {
            reachable.extend(graph.reachable(&node(index)));
        }

        for statement in graph.statements() {
            let state = map.get(&statement);
            if state == Relevance::True {
                for reference in graph.references(&statement).into_iter().flatten() {
                    prop_assert_eq!(map.get(reference), Relevance::True);
                }
            }
            prop_assert_eq!(state != Relevance::NotApplicable, reachable.contains(&statement));
        }
    }

    #[test]
    fn prop_episode_or_is_idempotent(result in population_result()) {
        let relevance = population_relevance(&result);
        let mut merged = relevance.clone();
        merged.merge_or(&relevance);
        prop_assert_eq!(&merged, &relevance);

        let mut episodes = EpisodeResults::new();
        episodes.insert("enc-1".into(), result.clone());
        prop_assert_eq!(episode_relevance(&episodes, &PopulationResult::new()), relevance);
    }

    #[test]
    fn prop_every_clause_gets_one_verdict(
        ids in prop::collection::btree_set(1u32..40, 0..12),
        results in prop::collection::btree_map(1u32..40, any::<bool>(), 0..12),
        relevance in prop_oneof![
            Just(Relevance::NotApplicable),
            Just(Relevance::True),
            Just(Relevance::False),
        ],
    ) {
        let mut clauses = ClauseMap::new();
        for id in &ids {
            let local_id = LocalId::new(id.to_string());
            clauses.insert(local_id.clone(), Clause::new(local_id));
        }
        let raw = results.iter().fold(RawPatientResults::new(), |raw, (id, value)| {
            raw.with_clause("Main", id.to_string(), RawValue::from(*value))
        });

        let verdicts = clause_results("Main", &clauses, &raw, relevance);
        prop_assert_eq!(verdicts.len(), clauses.len());
        for id in clauses.keys() {
            prop_assert!(verdicts.contains_key(id));
        }
    }
}
