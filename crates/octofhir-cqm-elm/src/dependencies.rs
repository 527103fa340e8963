//! Statement dependency graphs built from ELM

use indexmap::IndexSet;
use octofhir_cqm_types::{StatementGraph, StatementRef};
use serde_json::{Map, Value};

use crate::library::{ElmLibrary, StatementDef};

/// Statements referenced by one statement, in discovery order.
///
/// `ExpressionRef` and `FunctionRef` nodes are followed; a `libraryName`
/// is resolved through the include table, and kept as written when the
/// alias is unknown.
pub fn statement_references(library: &ElmLibrary, statement: &StatementDef) -> IndexSet<StatementRef> {
    let mut references = IndexSet::new();
    let mut stack = vec![statement.body()];

    while let Some(value) = stack.pop() {
        match value {
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(node) => {
                if let Some(reference) = reference_target(library, node) {
                    references.insert(reference);
                }
                stack.extend(
                    node.iter()
                        .rev()
                        .filter(|(key, _)| key.as_str() != "annotation")
                        .map(|(_, child)| child),
                );
            }
            _ => {}
        }
    }
    references
}

fn reference_target(library: &ElmLibrary, node: &Map<String, Value>) -> Option<StatementRef> {
    match node.get("type").and_then(Value::as_str) {
        Some("ExpressionRef" | "FunctionRef") => {}
        _ => return None,
    }
    let name = node.get("name").and_then(Value::as_str)?;
    let target = match node.get("libraryName").and_then(Value::as_str) {
        Some(alias) => library.include_path(alias).unwrap_or_else(|| {
            log::debug!("{}: unknown include alias '{}'", library.id(), alias);
            alias
        }),
        None => library.id(),
    };
    Some(StatementRef::new(target, name))
}

/// Add every statement of `library`, with its references, to `graph`
pub fn add_library(graph: &mut StatementGraph, library: &ElmLibrary) {
    for statement in library.statements() {
        let from = StatementRef::new(library.id(), statement.name.as_str());
        graph.add_statement(&from);
        for reference in statement_references(library, statement) {
            graph.add_reference(&from, reference);
        }
    }
}

/// Build the dependency graph of every statement in `libraries`
pub fn build_statement_graph<'a>(libraries: impl IntoIterator<Item = &'a ElmLibrary>) -> StatementGraph {
    let mut graph = StatementGraph::new();
    for library in libraries {
        add_library(&mut graph, library);
    }
    log::debug!("Built statement graph with {} statements", graph.len());
    graph
}
