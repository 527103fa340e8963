//! Raw per-patient engine output

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{LocalId, RawValue};

/// Raw clause results of one library, keyed by local id
pub type LibraryClauseResults = IndexMap<String, RawValue>;

/// Everything the execution engine produced for one patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPatientResults {
    /// Main-library statement name to result
    #[serde(default)]
    pub statements: IndexMap<String, RawValue>,
    /// Library name to clause results
    #[serde(default)]
    pub clauses: IndexMap<String, LibraryClauseResults>,
}

impl RawPatientResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statement(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.statements.insert(name.into(), value.into());
        self
    }

    pub fn with_clause(
        mut self,
        library: impl Into<String>,
        local_id: impl Into<String>,
        value: impl Into<RawValue>,
    ) -> Self {
        self.clauses
            .entry(library.into())
            .or_default()
            .insert(local_id.into(), value.into());
        self
    }

    pub fn statement(&self, name: &str) -> Option<&RawValue> {
        self.statements.get(name)
    }

    /// Clause results of a library, `None` when the engine produced none
    pub fn library_clauses(&self, library: &str) -> Option<&LibraryClauseResults> {
        self.clauses.get(library)
    }

    pub fn clause(&self, library: &str, local_id: &LocalId) -> Option<&RawValue> {
        self.library_clauses(library)?.get(local_id.as_str())
    }
}
