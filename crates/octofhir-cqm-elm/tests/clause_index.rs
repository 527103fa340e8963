//! Clause indexing over hand-built ELM statements

use octofhir_cqm_elm::{
    ClauseIndexer, ClauseMap, ElmError, ElmLibrary, OffsetTable, ProxyConstruct, index_library,
    index_statement,
};
use octofhir_cqm_types::LocalId;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn library(defs: Value) -> ElmLibrary {
    ElmLibrary::from_json(json!({
        "library": {
            "identifier": {"id": "Main", "version": "1.0.0"},
            "includes": {"def": [{"localIdentifier": "Global", "path": "MATGlobalCommonFunctions"}]},
            "statements": {"def": defs}
        }
    }))
    .unwrap()
}

/// `(clause, source)` pairs in discovery order
fn entries(clauses: &ClauseMap) -> Vec<(&str, Option<&str>)> {
    clauses
        .values()
        .map(|clause| {
            (
                clause.local_id.as_str(),
                clause.source_local_id.as_ref().map(LocalId::as_str),
            )
        })
        .collect()
}

fn query_statement() -> Value {
    json!({
        "localId": "26",
        "name": "Qualifying Encounters",
        "context": "Patient",
        "expression": {
            "localId": "25",
            "type": "Query",
            "source": [{
                "localId": "13",
                "alias": "E",
                "expression": {"localId": "12", "type": "Retrieve", "dataType": "{http://hl7.org/fhir}Encounter"}
            }],
            "let": [{
                "localId": "16",
                "identifier": "Period",
                "expression": {"localId": "15", "type": "Property", "path": "period", "scope": "E"}
            }],
            "where": {
                "localId": "20",
                "type": "Equal",
                "operand": [
                    {"localId": "18", "type": "Property", "path": "status", "scope": "E"},
                    {"localId": "19", "type": "Literal", "valueType": "{urn:hl7-org:elm-types:r1}String", "value": "finished"}
                ]
            },
            "return": {
                "localId": "22",
                "expression": {"localId": "21", "type": "AliasRef", "name": "E"}
            },
            "sort": {
                "localId": "24",
                "by": [{"localId": "23", "type": "ByColumn", "direction": "asc", "path": "period"}]
            }
        }
    })
}

#[test]
fn test_query_clauses() {
    let library = library(json!([query_statement()]));
    let clauses = index_statement(&library, "Qualifying Encounters").unwrap();

    assert_eq!(
        entries(&clauses),
        vec![
            ("26", None),
            ("25", None),
            ("13", Some("12")),
            ("12", None),
            ("16", Some("15")),
            ("15", None),
            ("20", None),
            ("18", None),
            ("19", None),
            ("22", Some("21")),
            ("21", None),
            ("24", Some("26")),
            ("23", Some("26")),
            ("14", Some("12")),
            ("17", Some("12")),
        ]
    );
    assert!(clauses.values().all(|clause| !clause.unsupported));
}

#[test]
fn test_first_and_last_source_reports_through_projection() {
    let library = library(json!([{
        "localId": "5",
        "name": "Latest Encounter",
        "expression": {
            "localId": "4",
            "type": "Last",
            "source": {"localId": "3", "type": "ExpressionRef", "name": "Qualifying Encounters"}
        }
    }]));
    let clauses = index_statement(&library, "Latest Encounter").unwrap();
    assert_eq!(entries(&clauses), vec![("5", None), ("4", None), ("3", Some("4"))]);
}

#[rstest]
#[case("6", vec![("8", None), ("7", None), ("5", None), ("6", Some("5"))])]
#[case("10", vec![("8", None), ("7", None), ("5", None), ("10", None)])]
fn test_type_cast(#[case] specifier_id: &str, #[case] expected: Vec<(&str, Option<&str>)>) {
    let library = library(json!([{
        "localId": "8",
        "name": "As Encounter",
        "expression": {
            "localId": "7",
            "type": "As",
            "operand": {"localId": "5", "type": "ExpressionRef", "name": "Latest Encounter"},
            "asTypeSpecifier": {
                "localId": specifier_id,
                "type": "NamedTypeSpecifier",
                "name": "{http://hl7.org/fhir}Encounter"
            }
        }
    }]));
    let clauses = index_statement(&library, "As Encounter").unwrap();
    assert_eq!(entries(&clauses), expected);
}

#[test]
fn test_library_reference_qualifier() {
    let library = library(json!([{
        "localId": "30",
        "name": "Stay",
        "annotation": [{
            "type": "Annotation",
            "s": {"r": "30", "s": [
                {"value": ["define ", "\"Stay\"", ": "]},
                {"r": "29", "s": [
                    {"r": "28", "s": [{"value": ["Global"]}]},
                    {"value": ["."]},
                    {"r": "27", "s": [{"value": ["\"Normalize Interval\"", "(", "...", ")"]}]}
                ]}
            ]}
        }],
        "expression": {
            "localId": "29",
            "type": "FunctionRef",
            "libraryName": "Global",
            "name": "Normalize Interval",
            "operand": [{"localId": "27", "type": "Null"}]
        }
    }]));
    let clauses = index_statement(&library, "Stay").unwrap();
    assert_eq!(
        entries(&clauses),
        vec![("30", None), ("29", None), ("28", Some("29")), ("27", None)]
    );
}

#[test]
fn test_library_reference_without_annotation() {
    let library = library(json!([{
        "localId": "30",
        "name": "Stay",
        "expression": {"localId": "29", "type": "ExpressionRef", "libraryName": "Global", "name": "Inpatient Encounter"}
    }]));
    let clauses = index_statement(&library, "Stay").unwrap();
    assert_eq!(entries(&clauses), vec![("30", None), ("29", None)]);
}

#[test]
fn test_case_item_reports_through_condition() {
    let library = library(json!([{
        "localId": "12",
        "name": "Stay Category",
        "expression": {
            "localId": "11",
            "type": "Case",
            "caseItem": [{
                "localId": "10",
                "when": {"localId": "8", "type": "ExpressionRef", "name": "Long Stay"},
                "then": {"localId": "9", "type": "Literal", "value": "long"}
            }],
            "else": {"localId": "7", "type": "Literal", "value": "short"}
        }
    }]));
    let clauses = index_statement(&library, "Stay Category").unwrap();
    assert_eq!(
        entries(&clauses),
        vec![("12", None), ("11", None), ("10", Some("8")), ("8", None), ("9", None), ("7", None)]
    );
}

#[test]
fn test_function_clauses_unsupported() {
    let library = library(json!([{
        "localId": "40",
        "name": "Normalize Interval",
        "type": "FunctionDef",
        "expression": {"localId": "39", "type": "If", "condition": {"localId": "38", "type": "Null"}}
    }]));
    let clauses = index_statement(&library, "Normalize Interval").unwrap();
    assert_eq!(clauses.len(), 3);
    assert!(clauses.values().all(|clause| clause.unsupported));
}

#[test]
fn test_unbound_scope_is_dropped() {
    let library = library(json!([{
        "localId": "6",
        "name": "Dangling",
        "expression": {"localId": "5", "type": "Property", "path": "status", "scope": "X"}
    }]));
    let clauses = index_statement(&library, "Dangling").unwrap();
    assert_eq!(entries(&clauses), vec![("6", None), ("5", None)]);
}

#[test]
fn test_custom_alias_offset() {
    let library = library(json!([query_statement()]));
    let offsets = OffsetTable::default().with_offset(ProxyConstruct::AliasBinding, 2);
    let clauses = ClauseIndexer::with_offsets(offsets)
        .index_statement(&library, "Qualifying Encounters")
        .unwrap();

    assert_eq!(clauses[&LocalId::new("13")].source_local_id, None);
    assert_eq!(
        clauses[&LocalId::new("14")].source_local_id,
        Some(LocalId::new("12"))
    );
}

#[test]
fn test_index_library_and_missing_statement() {
    let library = library(json!([query_statement(), {"localId": "2", "name": "Flag", "expression": {"localId": "1", "type": "Literal"}}]));
    let all = index_library(&library);
    assert_eq!(all.keys().collect::<Vec<_>>(), vec!["Qualifying Encounters", "Flag"]);

    assert!(matches!(
        index_statement(&library, "Nope"),
        Err(ElmError::StatementNotFound { .. })
    ));
}
