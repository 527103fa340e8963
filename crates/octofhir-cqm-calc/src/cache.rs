//! Shared clause-index cache
//!
//! Clause maps depend only on the ELM, so each statement is indexed once
//! and the map is shared by every patient calculated against it.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use octofhir_cqm_elm::{ClauseIndexer, ClauseMap, ElmLibrary, StatementDef};
use octofhir_cqm_types::StatementRef;

/// Clause maps keyed by library-qualified statement name
#[derive(Debug, Default)]
pub struct ClauseIndexCache {
    indexer: ClauseIndexer,
    entries: RwLock<HashMap<StatementRef, Arc<ClauseMap>>>,
}

impl ClauseIndexCache {
    /// Create a cache indexing with `indexer`
    pub fn new(indexer: ClauseIndexer) -> Self {
        Self {
            indexer,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Clause map of a statement, indexing it on first use
    pub fn clauses(&self, library: &ElmLibrary, statement: &StatementDef) -> Arc<ClauseMap> {
        let key = StatementRef::new(library.id(), statement.name.as_str());

        {
            let entries = self.entries.read();
            if let Some(clauses) = entries.get(&key) {
                return Arc::clone(clauses);
            }
        }

        let clauses = Arc::new(self.indexer.index_definition(statement));
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key).or_insert(clauses))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
