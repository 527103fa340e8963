//! Population codes and per-patient / per-episode population results

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::{EpisodeId, RawValue};

/// Standard population bucket defined by a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PopulationCode {
    #[serde(rename = "IPP")]
    InitialPopulation,
    #[serde(rename = "DENOM")]
    Denominator,
    #[serde(rename = "DENEX")]
    DenominatorExclusion,
    #[serde(rename = "DENEXCEP")]
    DenominatorException,
    #[serde(rename = "NUMER")]
    Numerator,
    #[serde(rename = "NUMEX")]
    NumeratorExclusion,
    #[serde(rename = "MSRPOPL")]
    MeasurePopulation,
    #[serde(rename = "MSRPOPLEX")]
    MeasurePopulationExclusion,
    #[serde(rename = "STRAT")]
    Stratification,
}

impl PopulationCode {
    /// Every population code, in canonical order
    pub const ALL: [PopulationCode; 9] = [
        Self::InitialPopulation,
        Self::Denominator,
        Self::DenominatorExclusion,
        Self::DenominatorException,
        Self::Numerator,
        Self::NumeratorExclusion,
        Self::MeasurePopulation,
        Self::MeasurePopulationExclusion,
        Self::Stratification,
    ];

    /// The code as written in measure definitions
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialPopulation => "IPP",
            Self::Denominator => "DENOM",
            Self::DenominatorExclusion => "DENEX",
            Self::DenominatorException => "DENEXCEP",
            Self::Numerator => "NUMER",
            Self::NumeratorExclusion => "NUMEX",
            Self::MeasurePopulation => "MSRPOPL",
            Self::MeasurePopulationExclusion => "MSRPOPLEX",
            Self::Stratification => "STRAT",
        }
    }

    /// Parse a population-set key such as `NUMER` or `STRAT_2`.
    ///
    /// Returns the code and the numeric suffix, if any. Keys starting with
    /// `_` are bookkeeping entries and never parse.
    pub fn parse_key(key: &str) -> Option<(Self, Option<usize>)> {
        if key.starts_with('_') {
            return None;
        }
        if let Ok(code) = key.parse() {
            return Some((code, None));
        }
        let (base, suffix) = key.rsplit_once('_')?;
        let index = suffix.parse().ok()?;
        Some((base.parse().ok()?, Some(index)))
    }
}

impl FromStr for PopulationCode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ModelError::unknown_population_code(s))
    }
}

impl fmt::Display for PopulationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slot in a population result: a population code or the observation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Bucket {
    Population(PopulationCode),
    /// Continuous-variable observation values
    Values,
}

impl Bucket {
    pub const VALUES_KEY: &'static str = "values";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Population(code) => code.as_str(),
            Self::Values => Self::VALUES_KEY,
        }
    }
}

impl From<PopulationCode> for Bucket {
    fn from(code: PopulationCode) -> Self {
        Self::Population(code)
    }
}

impl FromStr for Bucket {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::VALUES_KEY {
            Ok(Self::Values)
        } else {
            s.parse().map(Self::Population)
        }
    }
}

impl TryFrom<String> for Bucket {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Bucket> for String {
    fn from(bucket: Bucket) -> Self {
        bucket.as_str().to_string()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Population Result
// ============================================================================

/// Membership counts per population bucket for a patient or an episode.
///
/// Only buckets defined by the population criteria are present; rules that
/// zero a bucket never insert one that is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationResult {
    counts: IndexMap<PopulationCode, u32>,
    values: Option<Vec<RawValue>>,
}

impl PopulationResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a result with every given code at zero, and an empty
    /// observation list when `with_values` is set
    pub fn zeroed(codes: impl IntoIterator<Item = PopulationCode>, with_values: bool) -> Self {
        Self {
            counts: codes.into_iter().map(|code| (code, 0)).collect(),
            values: with_values.then(Vec::new),
        }
    }

    /// Set a count, builder style
    pub fn with_count(mut self, code: PopulationCode, count: u32) -> Self {
        self.set(code, count);
        self
    }

    /// Set the observation list, builder style
    pub fn with_values(mut self, values: Vec<RawValue>) -> Self {
        self.values = Some(values);
        self
    }

    /// Count for a bucket, if defined
    pub fn get(&self, code: PopulationCode) -> Option<u32> {
        self.counts.get(&code).copied()
    }

    /// Set the count for a bucket
    pub fn set(&mut self, code: PopulationCode, count: u32) {
        self.counts.insert(code, count);
    }

    pub fn contains(&self, code: PopulationCode) -> bool {
        self.counts.contains_key(&code)
    }

    /// True when the bucket is defined and its count is zero
    pub fn is_zero(&self, code: PopulationCode) -> bool {
        self.get(code) == Some(0)
    }

    /// True when the bucket is defined and its count is above zero
    pub fn is_positive(&self, code: PopulationCode) -> bool {
        self.get(code).is_some_and(|count| count > 0)
    }

    /// Zero a bucket if it is defined
    pub fn zero(&mut self, code: PopulationCode) {
        if let Some(count) = self.counts.get_mut(&code) {
            *count = 0;
        }
    }

    /// Observation values, if the criteria define observations
    pub fn values(&self) -> Option<&[RawValue]> {
        self.values.as_deref()
    }

    /// Append an observation value, creating the list if needed
    pub fn push_value(&mut self, value: RawValue) {
        self.values.get_or_insert_with(Vec::new).push(value);
    }

    /// Empty the observation list if it is defined
    pub fn clear_values(&mut self) {
        if let Some(values) = self.values.as_mut() {
            values.clear();
        }
    }

    /// Defined counts in insertion order
    pub fn counts(&self) -> impl Iterator<Item = (PopulationCode, u32)> + '_ {
        self.counts.iter().map(|(code, count)| (*code, *count))
    }

    /// Every defined bucket, observation list last
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.counts
            .keys()
            .copied()
            .map(Bucket::Population)
            .chain(self.values.is_some().then_some(Bucket::Values))
    }

    /// Add another result into this one: counts are summed and observation
    /// values appended in order.
    pub fn accumulate(&mut self, other: &PopulationResult) {
        for (code, count) in other.counts() {
            *self.counts.entry(code).or_insert(0) += count;
        }
        if let Some(values) = &other.values {
            self.values
                .get_or_insert_with(Vec::new)
                .extend(values.iter().cloned());
        }
    }
}

impl Serialize for PopulationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.counts.len() + usize::from(self.values.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (code, count) in &self.counts {
            map.serialize_entry(code.as_str(), count)?;
        }
        if let Some(values) = &self.values {
            map.serialize_entry(Bucket::VALUES_KEY, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PopulationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = IndexMap::<Bucket, serde_json::Value>::deserialize(deserializer)?;
        let mut result = PopulationResult::new();
        for (bucket, value) in entries {
            match bucket {
                Bucket::Population(code) => {
                    let count = u32::deserialize(value).map_err(de::Error::custom)?;
                    result.set(code, count);
                }
                Bucket::Values => {
                    let values = Vec::<RawValue>::deserialize(value).map_err(de::Error::custom)?;
                    result.values = Some(values);
                }
            }
        }
        Ok(result)
    }
}

/// Population results per episode of care, in discovery order
pub type EpisodeResults = IndexMap<EpisodeId, PopulationResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_key() {
        assert_eq!(
            PopulationCode::parse_key("IPP"),
            Some((PopulationCode::InitialPopulation, None))
        );
        assert_eq!(
            PopulationCode::parse_key("STRAT_2"),
            Some((PopulationCode::Stratification, Some(2)))
        );
        assert_eq!(PopulationCode::parse_key("_type"), None);
        assert_eq!(PopulationCode::parse_key("OBSERV"), None);
        assert_eq!(PopulationCode::parse_key("STRAT_x"), None);
    }

    #[test]
    fn test_zero_does_not_insert() {
        let mut result = PopulationResult::new().with_count(PopulationCode::Numerator, 1);
        result.zero(PopulationCode::NumeratorExclusion);
        result.clear_values();
        assert!(!result.contains(PopulationCode::NumeratorExclusion));
        assert_eq!(result.values(), None);
    }

    #[test]
    fn test_accumulate() {
        let mut total = PopulationResult::zeroed(
            [PopulationCode::InitialPopulation, PopulationCode::MeasurePopulation],
            true,
        );
        let episode = PopulationResult::new()
            .with_count(PopulationCode::InitialPopulation, 1)
            .with_count(PopulationCode::MeasurePopulation, 1)
            .with_values(vec![RawValue::from(30)]);
        total.accumulate(&episode);
        total.accumulate(&episode);
        assert_eq!(total.get(PopulationCode::InitialPopulation), Some(2));
        assert_eq!(total.values(), Some(&[RawValue::from(30), RawValue::from(30)][..]));
    }

    #[test]
    fn test_serialize_flat_map() {
        let result = PopulationResult::new()
            .with_count(PopulationCode::InitialPopulation, 1)
            .with_count(PopulationCode::MeasurePopulation, 1)
            .with_values(vec![RawValue::from(12)]);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"IPP": 1, "MSRPOPL": 1, "values": [12]})
        );
    }

    #[test]
    fn test_deserialize_flat_map() {
        let result: PopulationResult =
            serde_json::from_value(json!({"IPP": 3, "DENOM": 2, "values": [1, 2]})).unwrap();
        assert_eq!(result.get(PopulationCode::Denominator), Some(2));
        assert_eq!(result.values().map(<[RawValue]>::len), Some(2));
        assert!(serde_json::from_value::<PopulationResult>(json!({"BOGUS": 1})).is_err());
    }
}
