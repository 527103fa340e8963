//! Calculation options

use octofhir_cqm_elm::OffsetTable;
use serde::{Deserialize, Serialize};

/// Options controlling what a calculation produces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculationOptions {
    /// Produce per-clause verdicts in addition to statement verdicts
    pub include_clause_results: bool,
    /// Overrides the measure's own `calculate_sdes` flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculate_sdes: Option<bool>,
    /// Local-id offsets used when indexing clauses
    pub offsets: OffsetTable,
}

impl CalculationOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clause_results(mut self, include: bool) -> Self {
        self.include_clause_results = include;
        self
    }

    pub fn with_calculate_sdes(mut self, calculate: bool) -> Self {
        self.calculate_sdes = Some(calculate);
        self
    }

    pub fn with_offsets(mut self, offsets: OffsetTable) -> Self {
        self.offsets = offsets;
        self
    }

    /// Whether supplemental data elements are calculated, given the
    /// measure's own setting
    pub fn calculate_sdes(&self, measure_default: bool) -> bool {
        self.calculate_sdes.unwrap_or(measure_default)
    }
}
