//! Population sets and their resolution into calculation criteria

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};
use crate::{PopulationCode, StatementRef};

/// One population grouping of a measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Population key (`IPP`, `DENOM`, `STRAT_1`, ...) to statement
    #[serde(deserialize_with = "deserialize_populations")]
    pub populations: IndexMap<String, StatementRef>,
    #[serde(default)]
    pub stratifications: Vec<Stratification>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub supplemental_data_elements: Vec<StatementRef>,
}

/// A stratification of a population set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stratification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub statement: StatementRef,
}

/// A continuous-variable observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub observation_function: StatementRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_parameter: Option<StatementRef>,
}

/// Bookkeeping entries (`_type`, `_id`, ...) are dropped on load.
fn deserialize_populations<'de, D>(deserializer: D) -> Result<IndexMap<String, StatementRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| {
            StatementRef::deserialize(value)
                .map(|statement| (key, statement))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

impl PopulationSet {
    /// Resolve the population set for calculation.
    ///
    /// `stratification` is the 1-based stratification ordinal. STRAT comes
    /// from the matching entry of `stratifications`, or from a `STRAT_<n>`
    /// population key with the same ordinal.
    pub fn criteria(&self, stratification: Option<usize>) -> ModelResult<PopulationCriteria> {
        let mut populations = IndexMap::new();

        for (key, statement) in &self.populations {
            match PopulationCode::parse_key(key) {
                Some((PopulationCode::Stratification, suffix)) => {
                    if suffix == stratification {
                        populations.insert(PopulationCode::Stratification, statement.clone());
                    }
                }
                Some((code, None)) => {
                    populations.insert(code, statement.clone());
                }
                Some((_, Some(_))) | None => {
                    log::debug!("Population set {}: ignoring population key '{}'", self.id, key);
                }
            }
        }

        if let Some(ordinal) = stratification {
            let listed = ordinal
                .checked_sub(1)
                .and_then(|index| self.stratifications.get(index));
            match listed {
                Some(strat) => {
                    populations.insert(PopulationCode::Stratification, strat.statement.clone());
                }
                None if populations.contains_key(&PopulationCode::Stratification) => {}
                None => return Err(ModelError::unknown_stratification(&self.id, ordinal)),
            }
        }

        Ok(PopulationCriteria {
            populations,
            observations: self
                .observations
                .iter()
                .map(|observation| observation.observation_function.clone())
                .collect(),
            supplemental_data_elements: self.supplemental_data_elements.clone(),
        })
    }

    /// Number of stratifications, counting both listed stratifications and
    /// `STRAT_<n>` population keys
    pub fn stratification_count(&self) -> usize {
        let keyed = self
            .populations
            .keys()
            .filter_map(|key| match PopulationCode::parse_key(key) {
                Some((PopulationCode::Stratification, Some(n))) => Some(n),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        keyed.max(self.stratifications.len())
    }
}

/// A population set resolved for one calculation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopulationCriteria {
    pub populations: IndexMap<PopulationCode, StatementRef>,
    /// Observation function statements, in definition order
    pub observations: Vec<StatementRef>,
    pub supplemental_data_elements: Vec<StatementRef>,
}

impl PopulationCriteria {
    pub fn statement(&self, code: PopulationCode) -> Option<&StatementRef> {
        self.populations.get(&code)
    }

    pub fn codes(&self) -> impl Iterator<Item = PopulationCode> + '_ {
        self.populations.keys().copied()
    }

    pub fn has_observations(&self) -> bool {
        !self.observations.is_empty()
    }
}

// ============================================================================
// Population Set Keys
// ============================================================================

/// Key of a calculation: `PopulationSet_<n>` or
/// `PopulationSet_<n>_Stratification_<m>`, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PopulationSetKey {
    pub population_set: usize,
    pub stratification: Option<usize>,
}

impl PopulationSetKey {
    const SET_PREFIX: &'static str = "PopulationSet_";
    const STRAT_INFIX: &'static str = "_Stratification_";

    pub fn new(population_set: usize) -> Self {
        Self {
            population_set,
            stratification: None,
        }
    }

    pub fn stratified(population_set: usize, stratification: usize) -> Self {
        Self {
            population_set,
            stratification: Some(stratification),
        }
    }

    /// Zero-based index into a measure's population sets
    pub fn index(&self) -> Option<usize> {
        self.population_set.checked_sub(1)
    }
}

impl fmt::Display for PopulationSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::SET_PREFIX, self.population_set)?;
        if let Some(strat) = self.stratification {
            write!(f, "{}{}", Self::STRAT_INFIX, strat)?;
        }
        Ok(())
    }
}

impl FromStr for PopulationSetKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::invalid_population_set_key(s);
        let rest = s.strip_prefix(Self::SET_PREFIX).ok_or_else(invalid)?;
        let (set, strat) = match rest.split_once(Self::STRAT_INFIX) {
            Some((set, strat)) => (set, Some(strat)),
            None => (rest, None),
        };
        let population_set = set.parse().map_err(|_| invalid())?;
        let stratification = strat
            .map(|strat| strat.parse().map_err(|_| invalid()))
            .transpose()?;
        if population_set == 0 || stratification == Some(0) {
            return Err(invalid());
        }
        Ok(Self {
            population_set,
            stratification,
        })
    }
}

impl TryFrom<String> for PopulationSetKey {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PopulationSetKey> for String {
    fn from(key: PopulationSetKey) -> Self {
        key.to_string()
    }
}
