//! Specification engine: declarative model templates and their resolution
//!
//! A [`Specification`] declares the shape of an optimization problem — named
//! sets and parameters with defaults, lookup sources and derivation rules —
//! and `populate` turns a configuration plus database lookups into the
//! concrete, immutable [`ModelInstance`] handed to the solver boundary.

use thiserror::Error;

mod derive;
mod instance;
mod records;
mod registry;
mod spec;

pub use derive::{
    derivations_for, haversine_km, Derivation, DistanceDerivation, Resolved, DEFAULT_COORDINATE,
};
pub use instance::ModelInstance;
pub use records::{
    cartesian_product, expand_default, IndexedValue, ParamRecords, PopulateInput, SetRecords,
    Settings,
};
pub use registry::{RegistryError, SpecificationRegistry};
pub use spec::{
    GeneralSpecification, ParameterDef, SetDef, SimpleSpecification, Specification, Template,
};

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read populate input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse populate input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database lookup failed: {0}")]
    Data(#[from] mola_db::DataError),

    #[error("no user value, lookup source or default for '{name}'")]
    ResolutionFailure { name: String },

    #[error("derivation failed: {0}")]
    DerivationFailure(String),
}
