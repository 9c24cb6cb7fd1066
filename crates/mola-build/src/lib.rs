//! Model builder: configuration loading and end-to-end instance building
//!
//! The single entry point is [`build_instance`]: load a configuration,
//! resolve the specification it names, open the database it points at (if
//! any) and run `populate`. Sub-step failures surface as a build failure
//! naming the failing stage with the originating cause attached.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mola_db::LookupTables;
use mola_spec::{
    expand_default, ModelInstance, ParamRecords, PopulateInput, RegistryError, SetRecords,
    Settings, Specification, SpecificationRegistry,
};

pub mod logging;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configuration not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownSpecification(#[from] RegistryError),

    #[error("database stage failed: {0}")]
    Database(#[from] mola_db::DataError),

    #[error("populate stage failed for {spec}: {source}")]
    Populate {
        spec: String,
        #[source]
        source: mola_spec::SpecError,
    },
}

/// A persisted model configuration.
///
/// `sets`, `indexed_sets` and `parameters` hold the user's overrides of
/// the specification's declared defaults; `db_file` points at the LCA
/// database backing the lookup-sourced sets, when there is one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    pub specification: String,

    #[serde(default)]
    pub db_file: Option<PathBuf>,

    #[serde(default)]
    pub sets: SetRecords,

    #[serde(default)]
    pub indexed_sets: SetRecords,

    #[serde(default)]
    pub parameters: ParamRecords,

    #[serde(default)]
    pub doc_name: Option<String>,
}

impl Config {
    /// Set records handed to `populate`: indexed-set members merge into
    /// the plain sets under their declared names.
    pub fn populate_sets(&self) -> SetRecords {
        let mut sets = self.sets.clone();
        for (name, members) in &self.indexed_sets {
            sets.entry(name.clone()).or_insert_with(|| members.clone());
        }
        sets
    }
}

/// Load a configuration record from a JSON file.
pub fn get_config<P: AsRef<Path>>(path: P) -> Result<Config, BuildError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(BuildError::ConfigNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|source| BuildError::ConfigRead { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&text)?)
}

/// Split a configuration into the two independent JSON records consumed
/// by `populate`'s file-based form: set memberships and parameter values.
pub fn config_to_json(config: &Config) -> Result<(String, String), BuildError> {
    let sets = serde_json::to_string(&config.populate_sets())?;
    let parameters = serde_json::to_string(&config.parameters)?;
    Ok((sets, parameters))
}

/// Expand parameter declarations into fully indexed records for ad hoc
/// (database-free) set definitions. User-supplied records are kept;
/// everything else expands its declared default over the given sets.
///
/// With `index_value` set, absent entries become one `{index, value}`
/// record per index tuple; without it they collapse to a single scalar
/// record, for specifications whose consumers index externally.
pub fn build_parameters(
    sets: &SetRecords,
    parameters: &ParamRecords,
    spec: &dyn Specification,
    index_value: bool,
) -> ParamRecords {
    let mut built = parameters.clone();
    for (name, def) in &spec.template().parameters {
        if def.calculated || built.contains_key(name) {
            continue;
        }
        let Some(default) = def.default else { continue };
        let records = if index_value {
            expand_default(&def.index, sets, default)
        } else {
            expand_default(&[], sets, default)
        };
        built.insert(name.clone(), records);
    }
    built
}

/// Resolve a specification implementation by registry name.
pub fn create_specification(
    name: &str,
    settings: Settings,
) -> Result<Box<dyn Specification>, BuildError> {
    Ok(SpecificationRegistry::new().create(name, settings)?)
}

/// Build a solver-ready model instance from a configuration.
///
/// `settings` overrides the configuration's own settings when given.
pub fn build_instance(
    config: &Config,
    settings: Option<Settings>,
) -> Result<ModelInstance, BuildError> {
    let settings = settings.unwrap_or_else(|| config.settings.clone());
    let spec = create_specification(&config.specification, settings)?;

    let lookups = match &config.db_file {
        Some(path) => Some(LookupTables::open(path)?),
        None => None,
    };

    let input = PopulateInput::from_records(config.populate_sets(), config.parameters.clone());
    let instance = spec
        .populate(&input, lookups.as_ref(), None)
        .map_err(|source| BuildError::Populate { spec: spec.name().to_string(), source })?;

    tracing::info!(
        spec = spec.name(),
        entries = instance.len(),
        "built model instance"
    );
    Ok(instance)
}

/// InternalID → ReferenceID translation maps for the tables a viewer
/// typically needs alongside a built instance.
pub fn reference_maps(
    lookups: &LookupTables,
) -> Result<BTreeMap<String, std::collections::HashMap<i64, String>>, BuildError> {
    let mut tables = BTreeMap::new();
    tables.insert("processes".to_string(), "TBL_PROCESSES".to_string());
    tables.insert("flows".to_string(), "TBL_FLOWS".to_string());
    tables.insert("impact_categories".to_string(), "TBL_IMPACT_CATEGORIES".to_string());
    Ok(mola_db::get_ref_id_dicts(lookups.connection(), &tables)?)
}
