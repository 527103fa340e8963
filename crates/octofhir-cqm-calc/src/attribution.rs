//! Statement and clause coverage verdicts

use indexmap::IndexMap;
use octofhir_cqm_elm::{Clause, ClauseMap, ElmLibrary};
use octofhir_cqm_types::{
    FinalResult, LibraryClauseResults, LocalId, RawPatientResults, RawValue, Relevance,
    StatementRef,
};
use serde::Serialize;

use crate::relevance::StatementRelevanceMap;

/// Verdict for one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawValue>,
    pub relevance: Relevance,
    #[serde(rename = "final")]
    pub final_result: FinalResult,
}

/// Verdict for one clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawValue>,
    #[serde(rename = "final")]
    pub final_result: FinalResult,
}

/// Library name to statement name to verdict
pub type StatementResults = IndexMap<String, IndexMap<String, StatementResult>>;

/// Library name to statement name to clause id to verdict
pub type ClauseResults = IndexMap<String, IndexMap<String, IndexMap<LocalId, ClauseResult>>>;

/// Final verdict of a statement.
///
/// Supplemental data elements that are not being calculated count as not
/// applicable whatever their relevance.
pub fn statement_verdict(
    relevance: Relevance,
    uncalculated_sde: bool,
    library_results: Option<&LibraryClauseResults>,
    raw: Option<&RawValue>,
) -> FinalResult {
    if uncalculated_sde {
        return FinalResult::NotApplicable;
    }
    match (relevance, library_results) {
        (Relevance::NotApplicable, _) => FinalResult::NotApplicable,
        (Relevance::False, _) | (_, None) => FinalResult::Unhit,
        (Relevance::True, Some(_)) => FinalResult::from_pass(raw.is_some_and(RawValue::passes)),
    }
}

/// Final verdict of a clause, reading the proxied result where the clause
/// has one
pub fn clause_verdict(
    clause: &Clause,
    statement: Relevance,
    library_results: Option<&LibraryClauseResults>,
) -> FinalResult {
    if clause.unsupported {
        return FinalResult::NotApplicable;
    }
    match (statement, library_results) {
        (Relevance::NotApplicable, _) => FinalResult::NotApplicable,
        (Relevance::False, _) | (_, None) => FinalResult::Unhit,
        (Relevance::True, Some(results)) => FinalResult::from_pass(
            results
                .get(clause.result_id().as_str())
                .is_some_and(RawValue::passes),
        ),
    }
}

/// Verdicts for every statement of the given libraries
pub fn statement_results<'a>(
    libraries: impl IntoIterator<Item = &'a ElmLibrary>,
    raw: &RawPatientResults,
    relevance: &StatementRelevanceMap,
    supplemental_data_elements: &[StatementRef],
    calculate_sdes: bool,
) -> StatementResults {
    let mut results = StatementResults::new();
    for library in libraries {
        let library_results = raw.library_clauses(library.id());
        let statements = library
            .statements()
            .iter()
            .map(|statement| {
                let reference = StatementRef::new(library.id(), statement.name.as_str());
                let statement_raw = statement
                    .local_id
                    .as_ref()
                    .and_then(|id| raw.clause(library.id(), id));
                let uncalculated_sde =
                    !calculate_sdes && supplemental_data_elements.contains(&reference);
                let relevance = relevance.get(&reference);
                let result = StatementResult {
                    raw: statement_raw.cloned(),
                    relevance,
                    final_result: statement_verdict(
                        relevance,
                        uncalculated_sde,
                        library_results,
                        statement_raw,
                    ),
                };
                (statement.name.clone(), result)
            })
            .collect();
        results.insert(library.id().to_string(), statements);
    }
    results
}

/// Verdicts for every clause of one statement
pub fn clause_results(
    library: &str,
    clauses: &ClauseMap,
    raw: &RawPatientResults,
    statement: Relevance,
) -> IndexMap<LocalId, ClauseResult> {
    let library_results = raw.library_clauses(library);
    clauses
        .iter()
        .map(|(id, clause)| {
            let result = ClauseResult {
                raw: library_results
                    .and_then(|results| results.get(clause.result_id().as_str()))
                    .cloned(),
                final_result: clause_verdict(clause, statement, library_results),
            };
            (id.clone(), result)
        })
        .collect()
}
