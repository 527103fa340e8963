//! CLI functionality for the cqm tool
//!
//! This module contains:
//! - Measure calculation over raw engine results
//! - Clause and dependency indexing of ELM libraries
//! - Output formatting

pub mod calculate;
pub mod index;
pub mod output;
