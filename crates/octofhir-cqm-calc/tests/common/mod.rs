//! Shared measure fixtures

#![allow(dead_code)]

use octofhir_cqm_calc::Measure;
use octofhir_cqm_types::RawPatientResults;
use serde_json::{Value, json};

fn main_library() -> Value {
    json!({
        "library": {
            "identifier": {"id": "Main", "version": "1.0.0"},
            "includes": {"def": [
                {"localIdentifier": "Global", "path": "MATGlobalCommonFunctions", "version": "5.0.000"}
            ]},
            "statements": {"def": [
                {"name": "Patient", "context": "Patient",
                 "expression": {"type": "SingletonFrom", "operand": {"type": "Retrieve", "dataType": "{http://hl7.org/fhir}Patient"}}},
                {"localId": "3", "name": "Inpatient Encounter", "context": "Patient",
                 "expression": {"localId": "2", "type": "Retrieve", "dataType": "{http://hl7.org/fhir}Encounter"}},
                {"localId": "6", "name": "Initial Population", "context": "Patient",
                 "expression": {"localId": "5", "type": "Exists",
                                "operand": {"localId": "4", "type": "ExpressionRef", "name": "Inpatient Encounter"}}},
                {"localId": "8", "name": "Denominator", "context": "Patient",
                 "expression": {"localId": "7", "type": "ExpressionRef", "name": "Initial Population"}},
                {"localId": "12", "name": "Numerator", "context": "Patient",
                 "expression": {"localId": "11", "type": "Exists",
                                "operand": {"localId": "10", "type": "FunctionRef", "libraryName": "Global", "name": "Long Stay",
                                            "operand": [{"localId": "9", "type": "ExpressionRef", "name": "Inpatient Encounter"}]}}},
                {"localId": "14", "name": "SDE Sex", "context": "Patient",
                 "expression": {"localId": "13", "type": "Literal", "value": "F"}},
                {"localId": "16", "name": "Stratum", "context": "Patient",
                 "expression": {"localId": "15", "type": "Literal", "value": "false"}}
            ]}
        }
    })
}

fn global_library() -> Value {
    json!({
        "library": {
            "identifier": {"id": "MATGlobalCommonFunctions", "version": "5.0.000"},
            "statements": {"def": [
                {"localId": "4", "name": "Long Stay", "context": "Patient", "type": "FunctionDef",
                 "operand": [{"name": "Encounters"}],
                 "expression": {"localId": "3", "type": "Query",
                                "source": [{"localId": "2", "alias": "E", "expression": {"localId": "1", "type": "OperandRef", "name": "Encounters"}}]}}
            ]}
        }
    })
}

/// Patient-based proportion measure with one stratification and one SDE
pub fn proportion_measure() -> Measure {
    Measure::from_json(json!({
        "id": "measure-1",
        "title": "Inpatient Long Stay",
        "main_cql_library": "Main",
        "calculation_method": "PATIENT",
        "calculate_sdes": false,
        "population_sets": [{
            "id": "PopulationSet_1",
            "populations": {
                "_type": "CQL::ProportionPopulationMap",
                "IPP": {"library_name": "Main", "statement_name": "Initial Population"},
                "DENOM": {"library_name": "Main", "statement_name": "Denominator"},
                "NUMER": {"library_name": "Main", "statement_name": "Numerator"}
            },
            "stratifications": [{
                "id": "PopulationSet_1_Stratification_1",
                "statement": {"library_name": "Main", "statement_name": "Stratum"}
            }],
            "supplemental_data_elements": [
                {"library_name": "Main", "statement_name": "SDE Sex"}
            ]
        }],
        "cql_libraries": [
            {"library_name": "Main", "elm": main_library()},
            {"library_name": "MATGlobalCommonFunctions", "elm": global_library()}
        ]
    }))
    .unwrap()
}

/// Raw results of a patient in IPP and DENOM but not NUMER
pub fn denominator_patient() -> RawPatientResults {
    serde_json::from_value(json!({
        "statements": {
            "Initial Population": true,
            "Denominator": true,
            "Numerator": false,
            "SDE Sex": "F",
            "Stratum": false
        },
        "clauses": {
            "Main": {
                "2": [{"id": "enc-1"}],
                "3": [{"id": "enc-1"}],
                "4": [{"id": "enc-1"}],
                "5": true,
                "6": true,
                "7": true,
                "8": true,
                "9": [{"id": "enc-1"}],
                "10": [],
                "11": false,
                "12": false,
                "13": "F",
                "14": "F",
                "15": false,
                "16": false
            }
        }
    }))
    .unwrap()
}

/// Episode-of-care continuous-variable measure
pub fn episode_measure() -> Measure {
    Measure::from_json(json!({
        "main_cql_library": "Stays",
        "calculation_method": "EPISODE_OF_CARE",
        "population_sets": [{
            "id": "PopulationSet_1",
            "populations": {
                "IPP": {"library_name": "Stays", "statement_name": "Initial Population"},
                "MSRPOPL": {"library_name": "Stays", "statement_name": "Measure Population"},
                "MSRPOPLEX": {"library_name": "Stays", "statement_name": "Measure Population Exclusions"}
            },
            "observations": [{
                "observation_function": {"library_name": "Stays", "statement_name": "Length Of Stay"},
                "observation_parameter": {"library_name": "Stays", "statement_name": "Measure Population"}
            }]
        }],
        "cql_libraries": [{
            "library_name": "Stays",
            "elm": {
                "identifier": {"id": "Stays"},
                "statements": {"def": [
                    {"localId": "2", "name": "Initial Population", "expression": {"localId": "1", "type": "Retrieve"}},
                    {"localId": "4", "name": "Measure Population",
                     "expression": {"localId": "3", "type": "ExpressionRef", "name": "Initial Population"}},
                    {"localId": "6", "name": "Measure Population Exclusions",
                     "expression": {"localId": "5", "type": "ExpressionRef", "name": "Measure Population"}},
                    {"localId": "9", "name": "Length Of Stay", "type": "FunctionDef",
                     "expression": {"localId": "8", "type": "DurationBetween",
                                    "operand": [{"localId": "7", "type": "ExpressionRef", "name": "Measure Population"}]}}
                ]}
            },
            "statement_dependencies": [
                {"statement_name": "Initial Population"},
                {"statement_name": "Measure Population", "statement_references": [
                    {"library_name": "Stays", "statement_name": "Initial Population"}
                ]},
                {"statement_name": "Measure Population Exclusions", "statement_references": [
                    {"library_name": "Stays", "statement_name": "Measure Population"}
                ]},
                {"statement_name": "Length Of Stay"}
            ]
        }]
    }))
    .unwrap()
}

/// Two stays, the second excluded
pub fn episode_patient() -> RawPatientResults {
    serde_json::from_value(json!({
        "statements": {
            "Initial Population": [{"id": "enc-1"}, {"id": "enc-2"}],
            "Measure Population": [{"id": "enc-1"}, {"id": "enc-2"}],
            "Measure Population Exclusions": [{"id": "enc-2"}],
            "Length Of Stay": [
                {"episode": {"id": "enc-1"}, "observation": 30},
                {"episode": {"id": "enc-2"}, "observation": 12}
            ]
        },
        "clauses": {
            "Stays": {
                "1": [{"id": "enc-1"}, {"id": "enc-2"}],
                "2": [{"id": "enc-1"}, {"id": "enc-2"}],
                "3": [{"id": "enc-1"}, {"id": "enc-2"}],
                "4": [{"id": "enc-1"}, {"id": "enc-2"}],
                "5": [{"id": "enc-2"}],
                "6": [{"id": "enc-2"}]
            }
        }
    }))
    .unwrap()
}
