//! Clause maps
//!
//! A clause is any ELM node with a `localId`. Engine output only records
//! results for some of them; the rest are proxies whose verdict is read
//! from another clause's result. [`ClauseIndexer`] walks a statement and
//! records, for each clause, which local id its result lives under.

use std::collections::HashMap;

use indexmap::IndexMap;
use octofhir_cqm_types::LocalId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::annotation::{Annotation, find_clause_for_library_reference};
use crate::error::ElmResult;
use crate::library::{ElmLibrary, StatementDef, local_id_of, object_local_id};
use crate::offsets::{OffsetTable, ProxyConstruct};

/// One clause of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub local_id: LocalId,
    /// Clause whose raw result stands in for this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_local_id: Option<LocalId>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unsupported: bool,
}

impl Clause {
    pub fn new(local_id: LocalId) -> Self {
        Self {
            local_id,
            source_local_id: None,
            unsupported: false,
        }
    }

    pub fn proxy(local_id: LocalId, source: LocalId) -> Self {
        Self {
            local_id,
            source_local_id: Some(source),
            unsupported: false,
        }
    }

    pub fn is_proxy(&self) -> bool {
        self.source_local_id.is_some()
    }

    /// Local id to read the raw result from
    pub fn result_id(&self) -> &LocalId {
        self.source_local_id.as_ref().unwrap_or(&self.local_id)
    }
}

/// Clauses of one statement in discovery order
pub type ClauseMap = IndexMap<LocalId, Clause>;

/// Walks statements and builds their [`ClauseMap`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseIndexer {
    offsets: OffsetTable,
}

impl ClauseIndexer {
    /// Create an indexer with the default offsets
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offsets(offsets: OffsetTable) -> Self {
        Self { offsets }
    }

    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// Index one statement of a library by name
    pub fn index_statement(&self, library: &ElmLibrary, statement_name: &str) -> ElmResult<ClauseMap> {
        let statement = library.statement(statement_name)?;
        Ok(self.index_definition(statement))
    }

    /// Index every statement of a library
    pub fn index_library(&self, library: &ElmLibrary) -> IndexMap<String, ClauseMap> {
        library
            .statements()
            .iter()
            .map(|statement| (statement.name.clone(), self.index_definition(statement)))
            .collect()
    }

    /// Index a statement definition
    pub fn index_definition(&self, statement: &StatementDef) -> ClauseMap {
        let mut walk = ClauseWalk::new(&self.offsets, statement);
        walk.visit(statement.body());
        let mut clauses = walk.finish();

        if statement.kind.is_function() {
            for clause in clauses.values_mut() {
                clause.unsupported = true;
            }
        }
        log::trace!("Indexed statement '{}': {} clauses", statement.name, clauses.len());
        clauses
    }
}

/// Index one statement of a library with the default offsets
pub fn index_statement(library: &ElmLibrary, statement_name: &str) -> ElmResult<ClauseMap> {
    ClauseIndexer::new().index_statement(library, statement_name)
}

/// Index every statement of a library with the default offsets
pub fn index_library(library: &ElmLibrary) -> IndexMap<String, ClauseMap> {
    ClauseIndexer::new().index_library(library)
}

// ============================================================================
// Statement Walk
// ============================================================================

/// Source of a proxy whose target may only be known after the walk
#[derive(Debug)]
enum ProxySource {
    Clause(LocalId),
    /// Alias not yet bound when the scope reference was seen
    Alias(String),
}

#[derive(Debug)]
struct DeferredProxy {
    clause: LocalId,
    source: ProxySource,
}

struct ClauseWalk<'a> {
    offsets: &'a OffsetTable,
    annotation: &'a [Annotation],
    statement_id: Option<&'a LocalId>,
    clauses: ClauseMap,
    aliases: HashMap<String, LocalId>,
    deferred: Vec<DeferredProxy>,
}

impl<'a> ClauseWalk<'a> {
    fn new(offsets: &'a OffsetTable, statement: &'a StatementDef) -> Self {
        Self {
            offsets,
            annotation: &statement.annotation,
            statement_id: statement.local_id.as_ref(),
            clauses: ClauseMap::new(),
            aliases: HashMap::new(),
            deferred: Vec::new(),
        }
    }

    /// Plain entries never replace a proxy
    fn record(&mut self, id: LocalId) {
        self.clauses
            .entry(id.clone())
            .or_insert_with(|| Clause::new(id));
    }

    fn proxy(&mut self, id: LocalId, source: LocalId) {
        self.clauses.insert(id.clone(), Clause::proxy(id, source));
    }

    fn defer(&mut self, clause: Option<LocalId>, source: ProxySource) {
        match clause {
            Some(clause) => self.deferred.push(DeferredProxy { clause, source }),
            None => log::debug!("Skipping proxy without a numeric local id ({:?})", source),
        }
    }

    fn offset(&self, id: &LocalId, construct: ProxyConstruct) -> Option<LocalId> {
        id.offset(self.offsets.offset(construct))
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| self.visit(item)),
            Value::Object(node) => self.visit_node(node),
            _ => {}
        }
    }

    fn visit_node(&mut self, node: &Map<String, Value>) {
        let node_id = object_local_id(node);
        if let Some(id) = &node_id {
            self.record(id.clone());
            match node.get("type").and_then(Value::as_str) {
                Some("First" | "Last") => {
                    if let Some(source_id) = node.get("source").and_then(local_id_of) {
                        self.defer(Some(source_id), ProxySource::Clause(id.clone()));
                    }
                }
                Some("ExpressionRef" | "FunctionRef") => {
                    if let Some(library_name) = node.get("libraryName").and_then(Value::as_str) {
                        self.library_reference(id, library_name);
                    }
                }
                _ => {}
            }
        }

        for (key, child) in node {
            match key.as_str() {
                "localId" | "type" | "annotation" => {}
                "alias" => self.alias_binding(node, child),
                "scope" => self.scope_reference(node_id.as_ref(), child),
                "asTypeSpecifier" => self.type_cast(child),
                "sort" => self.visit_sort(child),
                "let" => self.visit_let(child),
                "return" => {
                    if let (Some(return_id), Some(expression_id)) = (
                        local_id_of(child),
                        child.get("expression").and_then(local_id_of),
                    ) {
                        self.defer(Some(return_id), ProxySource::Clause(expression_id));
                    }
                    self.visit(child);
                }
                "when" => {
                    if let (Some(id), Some(when_id)) = (&node_id, local_id_of(child)) {
                        self.proxy(id.clone(), when_id);
                    }
                    self.visit(child);
                }
                _ => self.visit(child),
            }
        }
    }

    fn library_reference(&mut self, ref_id: &LocalId, library_name: &str) {
        match find_clause_for_library_reference(self.annotation, ref_id, library_name) {
            Some(qualifier) => self.proxy(qualifier, ref_id.clone()),
            None => log::debug!(
                "No library qualifier clause for reference {} into {}",
                ref_id,
                library_name
            ),
        }
    }

    fn alias_binding(&mut self, node: &Map<String, Value>, alias: &Value) {
        let (Some(alias), Some(expression_id)) = (
            alias.as_str(),
            node.get("expression").and_then(local_id_of),
        ) else {
            return;
        };
        self.aliases.insert(alias.to_string(), expression_id.clone());
        let clause = self.offset(&expression_id, ProxyConstruct::AliasBinding);
        self.defer(clause, ProxySource::Clause(expression_id));
    }

    fn scope_reference(&mut self, node_id: Option<&LocalId>, scope: &Value) {
        let (Some(node_id), Some(scope)) = (node_id, scope.as_str()) else {
            return;
        };
        let source = match self.aliases.get(scope) {
            Some(expression_id) => ProxySource::Clause(expression_id.clone()),
            None => ProxySource::Alias(scope.to_string()),
        };
        let clause = self.offset(node_id, ProxyConstruct::ScopeReference);
        self.defer(clause, source);
    }

    /// The specifier itself gets a clause, reporting through the cast
    /// operand when that was indexed; its subtree is not indexed.
    fn type_cast(&mut self, specifier: &Value) {
        let Some(id) = local_id_of(specifier) else {
            return;
        };
        self.record(id.clone());
        match self.offset(&id, ProxyConstruct::TypeCast) {
            Some(source) => self.deferred.push(DeferredProxy {
                clause: id,
                source: ProxySource::Clause(source),
            }),
            None => log::debug!("Skipping type cast clause with non-numeric id {}", id),
        }
    }

    /// Sort clauses report through the statement itself.
    fn visit_sort(&mut self, sort: &Value) {
        let mut stack = vec![sort];
        while let Some(value) = stack.pop() {
            match value {
                Value::Array(items) => stack.extend(items.iter().rev()),
                Value::Object(node) => {
                    if let Some(id) = object_local_id(node) {
                        match self.statement_id {
                            Some(statement_id) => self.proxy(id, statement_id.clone()),
                            None => self.record(id),
                        }
                    }
                    stack.extend(node.values().rev());
                }
                _ => {}
            }
        }
    }

    fn visit_let(&mut self, lets: &Value) {
        let Some(lets) = lets.as_array() else {
            return;
        };
        for let_clause in lets {
            let expression = let_clause.get("expression");
            match (local_id_of(let_clause), expression.and_then(local_id_of)) {
                (Some(id), Some(expression_id)) => self.proxy(id, expression_id),
                (Some(id), None) => self.record(id),
                _ => {}
            }
            if let Some(expression) = expression {
                self.visit(expression);
            }
        }
    }

    /// Apply deferred proxies whose source clause exists
    fn finish(mut self) -> ClauseMap {
        for DeferredProxy { clause, source } in std::mem::take(&mut self.deferred) {
            let source = match source {
                ProxySource::Clause(id) => Some(id),
                ProxySource::Alias(alias) => self.aliases.get(&alias).cloned(),
            };
            match source {
                Some(source) if self.clauses.contains_key(&source) => self.proxy(clause, source),
                _ => log::trace!("Dropping proxy for clause {}: source not indexed", clause),
            }
        }
        self.clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_id() {
        let plain = Clause::new(LocalId::new("4"));
        let proxy = Clause::proxy(LocalId::new("5"), LocalId::new("4"));
        assert_eq!(plain.result_id(), &LocalId::new("4"));
        assert_eq!(proxy.result_id(), &LocalId::new("4"));
        assert!(proxy.is_proxy());
        assert!(!plain.is_proxy());
    }
}
