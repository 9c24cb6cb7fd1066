//! The resolved model instance handed to the solver boundary

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{IndexedValue, ParamRecords, SetRecords};

/// Fully resolved set and parameter data, ready for solver instantiation.
///
/// Instances are immutable once built; a new configuration always produces
/// a new instance. Downstream consumers read membership and values but
/// never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInstance {
    sets: SetRecords,
    parameters: ParamRecords,
}

impl ModelInstance {
    pub(crate) fn new(sets: SetRecords, parameters: ParamRecords) -> Self {
        Self { sets, parameters }
    }

    /// Number of resolved entries (sets plus parameters). Zero signals a
    /// resolution failure for any non-degenerate configuration.
    pub fn len(&self) -> usize {
        self.sets.len() + self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sets(&self) -> &SetRecords {
        &self.sets
    }

    pub fn parameters(&self) -> &ParamRecords {
        &self.parameters
    }

    pub fn set(&self, name: &str) -> Option<&[String]> {
        self.sets.get(name).map(Vec::as_slice)
    }

    pub fn parameter(&self, name: &str) -> Option<&[IndexedValue]> {
        self.parameters.get(name).map(Vec::as_slice)
    }

    /// All values of one parameter as a flat index-tuple → value mapping.
    pub fn extract_values(&self, name: &str) -> BTreeMap<Vec<String>, f64> {
        self.parameter(name)
            .unwrap_or_default()
            .iter()
            .map(|record| (record.index.clone(), record.value))
            .collect()
    }

    /// Entry counts per set and parameter, for logging and CLI output.
    pub fn summary(&self) -> serde_json::Value {
        let sets: BTreeMap<&str, usize> =
            self.sets.iter().map(|(name, members)| (name.as_str(), members.len())).collect();
        let parameters: BTreeMap<&str, usize> = self
            .parameters
            .iter()
            .map(|(name, records)| (name.as_str(), records.len()))
            .collect();
        serde_json::json!({ "sets": sets, "parameters": parameters })
    }
}
