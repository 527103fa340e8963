//! Index command implementation

use super::output::{self, OutputFormat};
use anyhow::{Context, Result};
use octofhir_cqm_elm::{ClauseIndexer, ElmLibrary, build_statement_graph};
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Configuration for index command
pub struct IndexConfig {
    pub elm: PathBuf,
    pub statement: Option<String>,
    pub dependencies: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Load an ELM library from a JSON file
pub fn load_library(path: &Path) -> Result<ElmLibrary> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open ELM file: {}", path.display()))?;
    ElmLibrary::from_reader(file)
        .with_context(|| format!("Failed to load ELM library: {}", path.display()))
}

/// Build the index output for a library
pub fn run(library: &ElmLibrary, statement: Option<&str>, dependencies: bool) -> Result<Value> {
    if dependencies {
        let graph = build_statement_graph([library]);
        return Ok(serde_json::to_value(graph)?);
    }

    let indexer = ClauseIndexer::new();
    let value = match statement {
        Some(name) => serde_json::to_value(
            indexer
                .index_statement(library, name)
                .with_context(|| format!("Failed to index statement '{}'", name))?,
        )?,
        None => serde_json::to_value(indexer.index_library(library))?,
    };
    Ok(value)
}

/// Print clause maps or the statement dependency graph of an ELM library
pub fn index(config: IndexConfig) -> Result<()> {
    let library = load_library(&config.elm)?;
    log::debug!(
        "Loaded library {} with {} statements",
        library.id(),
        library.statements().len()
    );
    let value = run(&library, config.statement.as_deref(), config.dependencies)?;
    output::print_output(&value, config.output_format, config.output_file.as_deref())
}
