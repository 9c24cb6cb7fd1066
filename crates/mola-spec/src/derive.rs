//! Derivation strategies for calculated parameters
//!
//! Each strategy is a pure function from resolved sets/parameters to the
//! records of one additional parameter. Strategies run after base
//! resolution, so they may reference resolved set membership.

use std::collections::BTreeSet;

use crate::records::{IndexedValue, ParamRecords, SetRecords, Settings};
use crate::SpecError;

/// Reference point used when a coordinate entry is missing: central Spain
/// (latitude, longitude), matching the region of the bundled test data.
/// A declared origin of (0, 0) is therefore 4487 km away, not 0 km.
pub const DEFAULT_COORDINATE: (f64, f64) = (40.2, -3.9);

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km between two (latitude, longitude) points.
pub fn haversine_km(origin: (f64, f64), destination: (f64, f64)) -> f64 {
    let (lat1, lon1) = (origin.0.to_radians(), origin.1.to_radians());
    let (lat2, lon2) = (destination.0.to_radians(), destination.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Resolved sets and parameters, the input to every derivation.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub sets: SetRecords,
    pub parameters: ParamRecords,
}

impl Resolved {
    /// Flat index-tuple → value view of one parameter.
    fn values(&self, name: &str) -> std::collections::BTreeMap<Vec<String>, f64> {
        self.parameters
            .get(name)
            .map(|records| {
                records
                    .iter()
                    .map(|record| (record.index.clone(), record.value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A named derivation producing the records of one calculated parameter.
pub trait Derivation {
    /// Name of the parameter this derivation produces.
    fn name(&self) -> &'static str;

    fn derive(&self, resolved: &Resolved) -> Result<Vec<IndexedValue>, SpecError>;
}

/// The derivations enabled by the given settings.
pub fn derivations_for(settings: &Settings) -> Vec<Box<dyn Derivation>> {
    let mut derivations: Vec<Box<dyn Derivation>> = Vec::new();
    if settings.distance_calculated {
        derivations.push(Box::new(DistanceDerivation));
    }
    derivations
}

/// Transport distance `dd`, indexed by (origin index tuple, destination
/// process).
///
/// Origins come from the coordinate parameters `X` (latitude) and `Y`
/// (longitude); destinations are the members of `P_m`, located by the
/// `PX`/`PY` entries filled in from the database when one is bound. Any
/// missing coordinate falls back to [`DEFAULT_COORDINATE`].
pub struct DistanceDerivation;

impl Derivation for DistanceDerivation {
    fn name(&self) -> &'static str {
        "dd"
    }

    fn derive(&self, resolved: &Resolved) -> Result<Vec<IndexedValue>, SpecError> {
        let xs = resolved.values("X");
        let ys = resolved.values("Y");
        if xs.is_empty() && ys.is_empty() {
            return Err(SpecError::DerivationFailure(
                "distance derivation requires coordinate parameters X and Y".to_string(),
            ));
        }

        let destinations = resolved
            .sets
            .get("P_m")
            .filter(|members| !members.is_empty())
            .ok_or_else(|| {
                SpecError::DerivationFailure(
                    "distance derivation requires a non-empty P_m set".to_string(),
                )
            })?;
        let px = resolved.values("PX");
        let py = resolved.values("PY");

        let origins: BTreeSet<&Vec<String>> = xs.keys().chain(ys.keys()).collect();
        let mut records = Vec::with_capacity(origins.len() * destinations.len());
        for origin in origins {
            let from = (
                xs.get(origin).copied().unwrap_or(DEFAULT_COORDINATE.0),
                ys.get(origin).copied().unwrap_or(DEFAULT_COORDINATE.1),
            );
            for process in destinations {
                let key = vec![process.clone()];
                let to = (
                    px.get(&key).copied().unwrap_or(DEFAULT_COORDINATE.0),
                    py.get(&key).copied().unwrap_or(DEFAULT_COORDINATE.1),
                );
                let mut index = origin.clone();
                index.push(process.clone());
                records.push(IndexedValue { index, value: haversine_km(from, to) });
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km((51.2, -0.6), (51.2, -0.6)), 0.0);
    }

    #[test]
    fn test_haversine_origin_to_default() {
        let d = haversine_km((0.0, 0.0), DEFAULT_COORDINATE);
        assert_eq!(d as i64, 4487);
    }

    #[test]
    fn test_distance_requires_coordinates() {
        let resolved = Resolved { sets: SetRecords::new(), parameters: ParamRecords::new() };
        let err = DistanceDerivation.derive(&resolved).unwrap_err();
        assert!(matches!(err, SpecError::DerivationFailure(_)));
    }

    #[test]
    fn test_distance_requires_destinations() {
        let mut parameters = ParamRecords::new();
        parameters.insert(
            "X".to_string(),
            vec![IndexedValue { index: vec!["k1".to_string()], value: 0.0 }],
        );
        parameters.insert(
            "Y".to_string(),
            vec![IndexedValue { index: vec!["k1".to_string()], value: 0.0 }],
        );
        let resolved = Resolved { sets: SetRecords::new(), parameters };
        let err = DistanceDerivation.derive(&resolved).unwrap_err();
        assert!(matches!(err, SpecError::DerivationFailure(_)));
    }

    #[test]
    fn test_distance_uses_destination_coordinates_when_present() {
        let mut sets = SetRecords::new();
        sets.insert("P_m".to_string(), vec!["pm1".to_string()]);
        let mut parameters = ParamRecords::new();
        parameters.insert(
            "X".to_string(),
            vec![IndexedValue { index: vec!["k1".to_string()], value: 40.0 }],
        );
        parameters.insert(
            "Y".to_string(),
            vec![IndexedValue { index: vec!["k1".to_string()], value: -4.0 }],
        );
        parameters.insert(
            "PX".to_string(),
            vec![IndexedValue { index: vec!["pm1".to_string()], value: 40.0 }],
        );
        parameters.insert(
            "PY".to_string(),
            vec![IndexedValue { index: vec!["pm1".to_string()], value: -4.0 }],
        );
        let resolved = Resolved { sets, parameters };
        let records = DistanceDerivation.derive(&resolved).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, vec!["k1", "pm1"]);
        assert!(records[0].value.abs() < 1e-9);
    }
}
