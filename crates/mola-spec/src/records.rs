//! Set and parameter records shared across the pipeline
//!
//! These are the serialized forms used by configuration files and by the
//! two-file input to `populate`: sets are plain member lists, parameters
//! are lists of `{index, value}` records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::SpecError;

/// Named set memberships.
pub type SetRecords = BTreeMap<String, Vec<String>>;

/// Named parameter values, one record per index tuple.
pub type ParamRecords = BTreeMap<String, Vec<IndexedValue>>;

/// One parameter value at one index tuple. A scalar parameter carries an
/// empty index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedValue {
    #[serde(default)]
    pub index: Vec<String>,
    pub value: f64,
}

/// Model settings toggling optional resolution steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Compute the derived transport-distance parameter after base
    /// resolution.
    #[serde(default)]
    pub distance_calculated: bool,
}

/// Input to `populate`: either records already in memory, or two JSON
/// files holding the same structures. Both forms must resolve identically
/// for identical content.
#[derive(Debug, Clone)]
pub enum PopulateInput {
    Records { sets: SetRecords, parameters: ParamRecords },
    Files { sets: PathBuf, parameters: PathBuf },
}

impl PopulateInput {
    pub fn from_records(sets: SetRecords, parameters: ParamRecords) -> Self {
        PopulateInput::Records { sets, parameters }
    }

    pub fn from_files(sets: impl Into<PathBuf>, parameters: impl Into<PathBuf>) -> Self {
        PopulateInput::Files { sets: sets.into(), parameters: parameters.into() }
    }

    /// Materialize the set and parameter records, reading and parsing the
    /// file form on demand.
    pub fn load(&self) -> Result<(SetRecords, ParamRecords), SpecError> {
        match self {
            PopulateInput::Records { sets, parameters } => {
                Ok((sets.clone(), parameters.clone()))
            }
            PopulateInput::Files { sets, parameters } => {
                let sets_text = std::fs::read_to_string(sets)?;
                let parameters_text = std::fs::read_to_string(parameters)?;
                Ok((
                    serde_json::from_str(&sets_text)?,
                    serde_json::from_str(&parameters_text)?,
                ))
            }
        }
    }
}

/// Cartesian product of the given member lists, in declaration order.
pub fn cartesian_product(members: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut tuples: Vec<Vec<String>> = vec![Vec::new()];
    for set in members {
        let mut next = Vec::with_capacity(tuples.len() * set.len());
        for tuple in &tuples {
            for member in set {
                let mut extended = tuple.clone();
                extended.push(member.clone());
                next.push(extended);
            }
        }
        tuples = next;
    }
    tuples
}

/// Expand a default value over the cartesian product of the named index
/// sets. An unindexed parameter yields one scalar record; an index set
/// with no resolved members yields no records.
pub fn expand_default(index: &[String], sets: &SetRecords, default: f64) -> Vec<IndexedValue> {
    if index.is_empty() {
        return vec![IndexedValue { index: Vec::new(), value: default }];
    }
    let members: Vec<Vec<String>> = index
        .iter()
        .map(|name| sets.get(name).cloned().unwrap_or_default())
        .collect();
    if members.iter().any(|m| m.is_empty()) {
        return Vec::new();
    }
    cartesian_product(&members)
        .into_iter()
        .map(|tuple| IndexedValue { index: tuple, value: default })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cartesian_product_order() {
        let product = cartesian_product(&[
            vec!["a".to_string(), "b".to_string()],
            vec!["1".to_string(), "2".to_string()],
        ]);
        assert_eq!(product.len(), 4);
        assert_eq!(product[0], vec!["a", "1"]);
        assert_eq!(product[3], vec!["b", "2"]);
    }

    #[test]
    fn test_expand_default_scalar_and_indexed() {
        let mut sets = SetRecords::new();
        sets.insert("K".to_string(), vec!["k1".to_string(), "k2".to_string()]);
        sets.insert("T".to_string(), vec!["t1".to_string()]);

        let scalar = expand_default(&[], &sets, 3.0);
        assert_eq!(scalar, vec![IndexedValue { index: vec![], value: 3.0 }]);

        let index = vec!["K".to_string(), "T".to_string()];
        let expanded = expand_default(&index, &sets, 0.0);
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].index, vec!["k1", "t1"]);

        // missing index set means no records, not a panic
        let missing = vec!["K".to_string(), "Z".to_string()];
        assert!(expand_default(&missing, &sets, 0.0).is_empty());
    }

    #[test]
    fn test_indexed_value_round_trips_config_form() {
        let json = r#"{"index": ["k1", "t1"], "value": 0.5}"#;
        let value: IndexedValue = serde_json::from_str(json).unwrap();
        assert_eq!(value.index, vec!["k1", "t1"]);
        assert_eq!(value.value, 0.5);
    }
}
