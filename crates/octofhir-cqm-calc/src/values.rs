//! Population value derivation
//!
//! Turns raw statement results into population counts, per patient or per
//! episode of care, and applies the zeroing policy.

use indexmap::IndexMap;
use octofhir_cqm_types::{
    EpisodeId, EpisodeResults, PopulationCriteria, PopulationResult, RawValue, StatementRef,
};
use serde::Serialize;

use crate::measure::MeasureBasis;
use crate::policy::apply_population_rules;

/// Derived populations for one patient
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedPopulations {
    pub population: PopulationResult,
    /// Per-episode results, episode-of-care measures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<EpisodeResults>,
}

/// Derive population results from main-library statement results
pub fn derive_population_values(
    criteria: &PopulationCriteria,
    statements: &IndexMap<String, RawValue>,
    basis: MeasureBasis,
) -> DerivedPopulations {
    match basis {
        MeasureBasis::Patient => DerivedPopulations {
            population: patient_population_values(criteria, statements),
            episodes: None,
        },
        MeasureBasis::EpisodeOfCare => {
            let episodes = episode_population_values(criteria, statements);
            DerivedPopulations {
                population: sum_episodes(criteria, &episodes),
                episodes: Some(episodes),
            }
        }
    }
}

/// Patient-based counts with the zeroing policy applied
pub fn patient_population_values(
    criteria: &PopulationCriteria,
    statements: &IndexMap<String, RawValue>,
) -> PopulationResult {
    let mut result = PopulationResult::new();
    for (code, statement) in &criteria.populations {
        let count = lookup(statements, statement).map_or(0, patient_count);
        result.set(*code, count);
    }

    if criteria.has_observations() {
        let mut values = Vec::with_capacity(criteria.observations.len());
        for observation in &criteria.observations {
            if let Some(raw) = lookup(statements, observation) {
                values.push(raw.unwrap_value().clone());
            }
        }
        result = result.with_values(values);
    }

    apply_population_rules(&mut result);
    result
}

/// Membership count of a patient-based population statement
fn patient_count(raw: &RawValue) -> u32 {
    match raw {
        RawValue::List(items) => u32::try_from(items.len()).unwrap_or(u32::MAX),
        RawValue::Boolean(true) => 1,
        _ => 0,
    }
}

/// Per-episode results in discovery order, each with the zeroing policy
/// applied
pub fn episode_population_values(
    criteria: &PopulationCriteria,
    statements: &IndexMap<String, RawValue>,
) -> EpisodeResults {
    let with_values = criteria.has_observations();
    let new_episode = || PopulationResult::zeroed(criteria.codes(), with_values);
    let mut episodes = EpisodeResults::new();

    for (code, statement) in &criteria.populations {
        for record in episode_records(statements, statement) {
            match EpisodeId::from_record(record) {
                Some(id) => episodes.entry(id).or_insert_with(new_episode).set(*code, 1),
                None => log::debug!("{}: {} element without an episode identity", code, statement),
            }
        }
    }

    for observation in &criteria.observations {
        for record in episode_records(statements, observation) {
            let record = if record.field("observation").is_some() {
                record
            } else {
                record.unwrap_value()
            };
            let (Some(id), Some(value)) = (EpisodeId::from_record(record), record.field("observation")) else {
                log::debug!("{}: observation without episode or value", observation);
                continue;
            };
            episodes
                .entry(id)
                .or_insert_with(new_episode)
                .push_value(value.unwrap_value().clone());
        }
    }

    for result in episodes.values_mut() {
        apply_population_rules(result);
    }
    episodes
}

/// Per-bucket sum over episodes; observation values concatenated in
/// episode order
fn sum_episodes(criteria: &PopulationCriteria, episodes: &EpisodeResults) -> PopulationResult {
    let mut total = PopulationResult::zeroed(criteria.codes(), criteria.has_observations());
    for episode in episodes.values() {
        total.accumulate(episode);
    }
    total
}

fn lookup<'a>(statements: &'a IndexMap<String, RawValue>, statement: &StatementRef) -> Option<&'a RawValue> {
    let raw = statements.get(&statement.statement);
    if raw.is_none() {
        log::debug!("No raw result for {}; counted as 0", statement);
    }
    raw
}

/// List elements of an episode-level statement
fn episode_records<'a>(
    statements: &'a IndexMap<String, RawValue>,
    statement: &StatementRef,
) -> &'a [RawValue] {
    lookup(statements, statement)
        .and_then(RawValue::as_list)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_cqm_types::PopulationCode;
    use octofhir_cqm_types::PopulationCode::{
        Denominator, InitialPopulation, MeasurePopulation, Numerator,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn criteria(codes: &[(PopulationCode, &str)], observations: &[&str]) -> PopulationCriteria {
        PopulationCriteria {
            populations: codes
                .iter()
                .map(|(code, name)| (*code, StatementRef::new("Main", *name)))
                .collect(),
            observations: observations
                .iter()
                .map(|name| StatementRef::new("Main", *name))
                .collect(),
            supplemental_data_elements: Vec::new(),
        }
    }

    fn statements(value: serde_json::Value) -> IndexMap<String, RawValue> {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case(json!(true), 1)]
    #[case(json!(false), 0)]
    #[case(json!([{"id": "a"}, {"id": "b"}]), 2)]
    #[case(json!([]), 0)]
    #[case(json!(null), 0)]
    #[case(json!({"value": 3}), 0)]
    fn test_patient_count(#[case] raw: serde_json::Value, #[case] expected: u32) {
        assert_eq!(patient_count(&RawValue::from(raw)), expected);
    }

    #[test]
    fn test_patient_based_missing_statement_counts_zero() {
        let criteria = criteria(
            &[(InitialPopulation, "Initial Population"), (Denominator, "Denominator")],
            &[],
        );
        let derived = derive_population_values(
            &criteria,
            &statements(json!({"Initial Population": true})),
            MeasureBasis::Patient,
        );
        assert_eq!(
            derived.population,
            PopulationResult::new()
                .with_count(InitialPopulation, 1)
                .with_count(Denominator, 0)
        );
        assert_eq!(derived.episodes, None);
    }

    #[test]
    fn test_patient_observation_unwraps_value() {
        let criteria = criteria(
            &[(InitialPopulation, "Initial Population"), (MeasurePopulation, "Measure Population")],
            &["Observation"],
        );
        let result = patient_population_values(
            &criteria,
            &statements(json!({
                "Initial Population": true,
                "Measure Population": true,
                "Observation": {"value": 42}
            })),
        );
        assert_eq!(result.values(), Some(&[RawValue::from(42)][..]));
    }

    #[test]
    fn test_episodes_in_discovery_order() {
        let criteria = criteria(
            &[
                (InitialPopulation, "Initial Population"),
                (MeasurePopulation, "Measure Population"),
            ],
            &["Length Of Stay"],
        );
        let raw = statements(json!({
            "Initial Population": [{"id": "enc-2"}, {"id": {"value": "enc-1"}}, {"id": "enc-3"}],
            "Measure Population": [{"id": "enc-1"}, {"id": "enc-2"}],
            "Length Of Stay": [
                {"episode": {"id": "enc-1"}, "observation": 5},
                {"episode": {"id": "enc-2"}, "observation": {"value": 3}}
            ]
        }));

        let derived = derive_population_values(&criteria, &raw, MeasureBasis::EpisodeOfCare);
        let episodes = derived.episodes.unwrap();

        assert_eq!(
            episodes.keys().map(EpisodeId::as_str).collect::<Vec<_>>(),
            vec!["enc-2", "enc-1", "enc-3"]
        );
        assert_eq!(
            episodes[&EpisodeId::new("enc-3")],
            PopulationResult::zeroed([InitialPopulation, MeasurePopulation], true)
                .with_count(InitialPopulation, 1)
        );
        assert_eq!(derived.population.get(InitialPopulation), Some(3));
        assert_eq!(derived.population.get(MeasurePopulation), Some(2));
        assert_eq!(
            derived.population.values(),
            Some(&[RawValue::from(3), RawValue::from(5)][..])
        );
    }

    #[test]
    fn test_episode_zeroing_applies_per_episode() {
        let criteria = criteria(
            &[
                (InitialPopulation, "Initial Population"),
                (Denominator, "Denominator"),
                (Numerator, "Numerator"),
            ],
            &[],
        );
        let raw = statements(json!({
            "Initial Population": [{"id": "a"}],
            "Denominator": [{"id": "a"}],
            "Numerator": [{"id": "a"}, {"id": "b"}]
        }));

        let derived = derive_population_values(&criteria, &raw, MeasureBasis::EpisodeOfCare);
        assert_eq!(derived.population.get(Numerator), Some(1));
        assert_eq!(
            derived.episodes.unwrap()[&EpisodeId::new("b")].get(Numerator),
            Some(0)
        );
    }

    #[test]
    fn test_no_episodes_yields_zero_population() {
        let criteria = criteria(&[(InitialPopulation, "Initial Population")], &["Observation"]);
        let derived = derive_population_values(
            &criteria,
            &statements(json!({"Initial Population": []})),
            MeasureBasis::EpisodeOfCare,
        );
        assert_eq!(
            derived.population,
            PopulationResult::zeroed([InitialPopulation], true)
        );
        assert!(derived.episodes.unwrap().is_empty());
    }
}
