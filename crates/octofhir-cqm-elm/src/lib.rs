//! ELM statement indexing for measure calculation
//!
//! Loads compiled ELM libraries and derives the two structures coverage
//! attribution needs:
//!
//! - a [`ClauseMap`] per statement, telling which local id carries each
//!   clause's raw result
//! - a [`StatementGraph`](octofhir_cqm_types::StatementGraph) of statement
//!   references across libraries

pub mod annotation;
pub mod clauses;
pub mod dependencies;
pub mod error;
pub mod library;
pub mod offsets;

pub use annotation::{Annotation, Narrative, find_clause_for_library_reference};
pub use clauses::{Clause, ClauseIndexer, ClauseMap, index_library, index_statement};
pub use dependencies::{add_library, build_statement_graph, statement_references};
pub use error::{ElmError, ElmResult};
pub use library::{ElmLibrary, IncludeDef, StatementDef, StatementKind, VersionedIdentifier};
pub use offsets::{OffsetTable, ProxyConstruct};
