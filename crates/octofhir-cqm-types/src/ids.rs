//! Identifiers for clauses and episodes of care

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RawValue;

/// Local identifier of a clause, scoped to its library.
///
/// ELM local ids are decimal strings; [`LocalId::offset`] does the
/// arithmetic the clause indexer relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    /// Create a local id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as it appears in ELM and in raw clause results
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the id is numeric
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// The id `delta` positions away, or `None` for non-numeric ids and
    /// results outside the `i64` range
    pub fn offset(&self, delta: i64) -> Option<Self> {
        let n = self.as_number()?.checked_add(delta)?;
        Some(Self(n.to_string()))
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LocalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque identity of an episode of care.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    /// Create an episode id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity of an episode record.
    ///
    /// Looks at the record's `id` (a string, a number, or a `{value}`
    /// wrapper), then at the `id` of a nested `episode` record.
    pub fn from_record(record: &RawValue) -> Option<Self> {
        if let Some(id) = record.field("id").and_then(Self::from_identity) {
            return Some(id);
        }
        record.field("episode").and_then(Self::from_record)
    }

    fn from_identity(value: &RawValue) -> Option<Self> {
        match value.unwrap_value() {
            RawValue::String(s) => Some(Self(s.clone())),
            RawValue::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EpisodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_id_offset() {
        let id = LocalId::new("42");
        assert_eq!(id.offset(1), Some(LocalId::new("43")));
        assert_eq!(id.offset(-1), Some(LocalId::new("41")));
        assert_eq!(LocalId::new("x").offset(1), None);
    }

    #[test]
    fn test_local_id_offset_out_of_range() {
        assert_eq!(LocalId::new(i64::MAX.to_string()).offset(1), None);
        assert_eq!(LocalId::new(i64::MIN.to_string()).offset(-1), None);
        assert_eq!(
            LocalId::new(i64::MAX.to_string()).offset(-1),
            Some(LocalId::new((i64::MAX - 1).to_string()))
        );
    }

    #[test]
    fn test_episode_id_from_record() {
        let plain = RawValue::from(json!({"id": "enc-1"}));
        assert_eq!(EpisodeId::from_record(&plain), Some(EpisodeId::new("enc-1")));

        let wrapped = RawValue::from(json!({"id": {"value": "enc-2"}}));
        assert_eq!(EpisodeId::from_record(&wrapped), Some(EpisodeId::new("enc-2")));

        let numeric = RawValue::from(json!({"id": 7}));
        assert_eq!(EpisodeId::from_record(&numeric), Some(EpisodeId::new("7")));

        let observation = RawValue::from(json!({"episode": {"id": "enc-3"}, "observation": 30}));
        assert_eq!(EpisodeId::from_record(&observation), Some(EpisodeId::new("enc-3")));

        assert_eq!(EpisodeId::from_record(&RawValue::from(true)), None);
    }
}
