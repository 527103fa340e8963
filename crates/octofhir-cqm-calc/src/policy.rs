//! Population zeroing policy
//!
//! Engine output counts each population independently; membership in a
//! later population only stands when the populations it depends on hold.
//! Rules are checked in order and only the first match applies.

use octofhir_cqm_types::{PopulationCode, PopulationResult};

use PopulationCode::{
    DenominatorException, DenominatorExclusion, Denominator, InitialPopulation, MeasurePopulation,
    MeasurePopulationExclusion, Numerator, NumeratorExclusion, Stratification,
};

/// Apply the zeroing policy in place. Buckets the result does not define
/// stay undefined.
pub fn apply_population_rules(result: &mut PopulationResult) {
    if result.is_zero(Stratification) {
        zero_all_except(result, None);
    } else if result.is_zero(InitialPopulation) {
        zero_all_except(result, Some(Stratification));
    } else if result.is_zero(Denominator) || result.is_zero(MeasurePopulation) {
        zero(
            result,
            &[
                DenominatorExclusion,
                DenominatorException,
                Numerator,
                NumeratorExclusion,
                MeasurePopulationExclusion,
            ],
        );
        result.clear_values();
    } else if denominator_excluded(result) {
        zero(result, &[Numerator, NumeratorExclusion, DenominatorException]);
    } else if result.is_positive(MeasurePopulationExclusion) {
        result.clear_values();
    } else if result.is_zero(Numerator) {
        result.zero(NumeratorExclusion);
    } else if result.is_positive(Numerator) {
        result.zero(DenominatorException);
    }
}

/// DENEX is positive and covers the whole denominator
fn denominator_excluded(result: &PopulationResult) -> bool {
    match (result.get(DenominatorExclusion), result.get(Denominator)) {
        (Some(denex), Some(denom)) => denex > 0 && denex >= denom,
        _ => false,
    }
}

fn zero(result: &mut PopulationResult, codes: &[PopulationCode]) {
    for code in codes {
        result.zero(*code);
    }
}

fn zero_all_except(result: &mut PopulationResult, keep: Option<PopulationCode>) {
    let codes: Vec<_> = result
        .counts()
        .map(|(code, _)| code)
        .filter(|code| Some(*code) != keep)
        .collect();
    zero(result, &codes);
    result.clear_values();
}
