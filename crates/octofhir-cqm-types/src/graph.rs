//! Statement dependency graph
//!
//! Nodes are library-qualified statement names; an edge `a -> b` means
//! statement `a` references statement `b`. The graph is only ever walked
//! backwards from population statements to mark relevance, never executed.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A library-qualified statement name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementRef {
    #[serde(rename = "library_name")]
    pub library: String,
    #[serde(rename = "statement_name")]
    pub statement: String,
}

impl StatementRef {
    pub fn new(library: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            statement: statement.into(),
        }
    }
}

impl fmt::Display for StatementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.\"{}\"", self.library, self.statement)
    }
}

/// One statement's outgoing references, as stored in measure definitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDependency {
    pub statement_name: String,
    #[serde(default)]
    pub statement_references: Vec<StatementRef>,
}

/// Adjacency map from statement to the statements it references.
///
/// Serialised per library as a list of [`StatementDependency`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, Vec<StatementDependency>>",
    into = "IndexMap<String, Vec<StatementDependency>>"
)]
pub struct StatementGraph {
    libraries: IndexMap<String, IndexMap<String, IndexSet<StatementRef>>>,
}

impl StatementGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no references (no-op if present)
    pub fn add_statement(&mut self, statement: &StatementRef) {
        self.node_mut(statement);
    }

    /// Add an edge. `from` becomes a node if needed; `to` does not.
    pub fn add_reference(&mut self, from: &StatementRef, to: StatementRef) {
        self.node_mut(from).insert(to);
    }

    fn node_mut(&mut self, statement: &StatementRef) -> &mut IndexSet<StatementRef> {
        self.libraries
            .entry(statement.library.clone())
            .or_default()
            .entry(statement.statement.clone())
            .or_default()
    }

    pub fn contains(&self, statement: &StatementRef) -> bool {
        self.references(statement).is_some()
    }

    /// Direct references of a statement, or `None` if it is not a node
    pub fn references(&self, statement: &StatementRef) -> Option<&IndexSet<StatementRef>> {
        self.libraries
            .get(&statement.library)?
            .get(&statement.statement)
    }

    /// Library names in insertion order
    pub fn libraries(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    /// Statement names of one library
    pub fn library_statements<'a>(&'a self, library: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.libraries
            .get(library)
            .into_iter()
            .flat_map(|statements| statements.keys().map(String::as_str))
    }

    /// Every node, library by library
    pub fn statements(&self) -> impl Iterator<Item = StatementRef> + '_ {
        self.libraries.iter().flat_map(|(library, statements)| {
            statements
                .keys()
                .map(move |statement| StatementRef::new(library.clone(), statement.clone()))
        })
    }

    pub fn len(&self) -> usize {
        self.libraries.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every statement reachable from `root`, `root` included, in
    /// depth-first discovery order. Edges to unknown statements are listed
    /// but not followed.
    pub fn reachable(&self, root: &StatementRef) -> Vec<StatementRef> {
        let mut seen = IndexSet::new();
        let mut stack = vec![root.clone()];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.clone()) {
                continue;
            }
            if let Some(references) = self.references(&node) {
                stack.extend(references.iter().rev().cloned());
            }
        }
        seen.into_iter().collect()
    }
}

impl From<IndexMap<String, Vec<StatementDependency>>> for StatementGraph {
    fn from(libraries: IndexMap<String, Vec<StatementDependency>>) -> Self {
        let mut graph = Self::new();
        for (library, dependencies) in libraries {
            for dependency in dependencies {
                let from = StatementRef::new(library.clone(), dependency.statement_name);
                graph.add_statement(&from);
                for reference in dependency.statement_references {
                    graph.add_reference(&from, reference);
                }
            }
        }
        graph
    }
}

impl From<StatementGraph> for IndexMap<String, Vec<StatementDependency>> {
    fn from(graph: StatementGraph) -> Self {
        graph
            .libraries
            .into_iter()
            .map(|(library, statements)| {
                let dependencies = statements
                    .into_iter()
                    .map(|(statement_name, references)| StatementDependency {
                        statement_name,
                        statement_references: references.into_iter().collect(),
                    })
                    .collect();
                (library, dependencies)
            })
            .collect()
    }
}
