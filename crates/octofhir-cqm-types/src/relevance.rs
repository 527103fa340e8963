//! Relevance and final-result verdicts

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Bucket;

/// Whether a statement could have influenced a patient's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relevance {
    /// Not reached by any population bucket
    #[default]
    #[serde(rename = "NA")]
    NotApplicable,
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
}

impl Relevance {
    pub fn from_bool(relevant: bool) -> Self {
        if relevant { Self::True } else { Self::False }
    }

    /// Apply a propagated relevance value.
    ///
    /// `True` is terminal; `NotApplicable` and `False` take the new value.
    /// Returns false when the state is terminal and propagation must stop.
    pub fn mark(&mut self, relevant: bool) -> bool {
        if *self == Self::True {
            return false;
        }
        *self = Self::from_bool(relevant);
        true
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => write!(f, "NA"),
            Self::True => write!(f, "TRUE"),
            Self::False => write!(f, "FALSE"),
        }
    }
}

/// Final coverage verdict for a statement or clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalResult {
    /// Unsupported clause or irrelevant statement
    #[serde(rename = "NA")]
    NotApplicable,
    /// Relevant logic that was never evaluated for this patient
    #[serde(rename = "UNHIT")]
    Unhit,
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
}

impl FinalResult {
    pub fn from_pass(passed: bool) -> Self {
        if passed { Self::True } else { Self::False }
    }
}

impl fmt::Display for FinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => write!(f, "NA"),
            Self::Unhit => write!(f, "UNHIT"),
            Self::True => write!(f, "TRUE"),
            Self::False => write!(f, "FALSE"),
        }
    }
}

/// Per-bucket relevance for a patient or episode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulationRelevance(IndexMap<Bucket, bool>);

impl PopulationRelevance {
    /// Every given bucket marked relevant
    pub fn all_relevant(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        Self(buckets.into_iter().map(|bucket| (bucket, true)).collect())
    }

    pub fn get(&self, bucket: impl Into<Bucket>) -> Option<bool> {
        self.0.get(&bucket.into()).copied()
    }

    pub fn set(&mut self, bucket: impl Into<Bucket>, relevant: bool) {
        self.0.insert(bucket.into(), relevant);
    }

    /// Mark a bucket irrelevant if it is defined
    pub fn downgrade(&mut self, bucket: impl Into<Bucket>) {
        if let Some(relevant) = self.0.get_mut(&bucket.into()) {
            *relevant = false;
        }
    }

    /// Bucket-wise OR; buckets only present in `other` are added
    pub fn merge_or(&mut self, other: &PopulationRelevance) {
        for (bucket, relevant) in other.iter() {
            let entry = self.0.entry(bucket).or_insert(false);
            *entry = *entry || relevant;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, bool)> + '_ {
        self.0.iter().map(|(bucket, relevant)| (*bucket, *relevant))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
