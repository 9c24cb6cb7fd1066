//! Specification templates and their resolution into model instances

use mola_db::LookupTables;

use crate::derive::{derivations_for, Resolved};
use crate::instance::ModelInstance;
use crate::records::{expand_default, ParamRecords, PopulateInput, SetRecords, Settings};
use crate::SpecError;

use std::collections::BTreeMap;

/// A declared set: its documentation and, for database-backed sets, the
/// lookup table that supplies members.
#[derive(Debug, Clone)]
pub struct SetDef {
    pub doc: String,
    pub lookup: Option<String>,
}

impl SetDef {
    fn user(doc: &str) -> Self {
        Self { doc: doc.to_string(), lookup: None }
    }

    fn lookup(doc: &str, table: &str) -> Self {
        Self { doc: doc.to_string(), lookup: Some(table.to_string()) }
    }
}

/// A declared parameter: index sets, default value and whether its records
/// are calculated by a derivation instead of supplied directly.
#[derive(Debug, Clone)]
pub struct ParameterDef {
    pub doc: String,
    pub index: Vec<String>,
    pub default: Option<f64>,
    pub calculated: bool,
}

impl ParameterDef {
    fn with_default(doc: &str, index: &[&str], default: f64) -> Self {
        Self {
            doc: doc.to_string(),
            index: index.iter().map(|s| s.to_string()).collect(),
            default: Some(default),
            calculated: false,
        }
    }

    fn calculated(doc: &str, index: &[&str]) -> Self {
        Self {
            doc: doc.to_string(),
            index: index.iter().map(|s| s.to_string()).collect(),
            default: None,
            calculated: true,
        }
    }
}

/// The declared shape of a model: its sets and parameters.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub sets: BTreeMap<String, SetDef>,
    pub parameters: BTreeMap<String, ParameterDef>,
}

/// A named, versioned model declaration.
///
/// Implementations are stateless templates plus a mutable settings bag;
/// `populate` starts a fresh resolution on every call and never mutates
/// the template.
pub trait Specification: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    fn settings(&self) -> &Settings;

    fn settings_mut(&mut self) -> &mut Settings;

    fn template(&self) -> &Template;

    /// Empty membership for every declared set, as a starting point for
    /// configuration editors.
    fn default_sets(&self) -> SetRecords {
        self.template()
            .sets
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .collect()
    }

    /// Default records for every supplied (non-calculated) parameter,
    /// expanded over the given set memberships.
    fn default_parameters(&self, sets: &SetRecords) -> ParamRecords {
        self.template()
            .parameters
            .iter()
            .filter(|(_, def)| !def.calculated)
            .filter_map(|(name, def)| {
                def.default
                    .map(|value| (name.clone(), expand_default(&def.index, sets, value)))
            })
            .collect()
    }

    /// Resolve declared sets and parameters into a concrete instance.
    fn populate(
        &self,
        input: &PopulateInput,
        lookups: Option<&LookupTables>,
        elementary_flow_ref_ids: Option<&[String]>,
    ) -> Result<ModelInstance, SpecError> {
        resolve(self.template(), self.settings(), input, lookups, elementary_flow_ref_ids)
    }
}

/// Shared resolution pipeline: lookup-backed sets first, then plain sets,
/// then parameters, then derivations — derived parameters may reference
/// resolved set membership.
fn resolve(
    template: &Template,
    settings: &Settings,
    input: &PopulateInput,
    lookups: Option<&LookupTables>,
    elementary_flow_ref_ids: Option<&[String]>,
) -> Result<ModelInstance, SpecError> {
    let (user_sets, user_parameters) = input.load()?;

    let mut sets = SetRecords::new();
    for (name, def) in &template.sets {
        let members = if def.lookup.as_deref() == Some("E") && elementary_flow_ref_ids.is_some() {
            elementary_flow_ref_ids.unwrap_or_default().to_vec()
        } else if let Some(user) = user_sets.get(name).filter(|m| !m.is_empty()) {
            user.clone()
        } else if let (Some(lookup_name), Some(lookups)) = (&def.lookup, lookups) {
            lookups.get(lookup_name)?.column_strings("REF_ID")
        } else {
            Vec::new()
        };
        tracing::debug!(set = %name, members = members.len(), "resolved set");
        sets.insert(name.clone(), members);
    }
    // ad hoc sets supplied by the user but not declared pass through
    for (name, members) in user_sets {
        sets.entry(name).or_insert(members);
    }

    let mut parameters = ParamRecords::new();
    for (name, def) in &template.parameters {
        if def.calculated {
            continue;
        }
        if let Some(records) = user_parameters.get(name).filter(|r| !r.is_empty()) {
            parameters.insert(name.clone(), records.clone());
        } else if let Some(default) = def.default {
            parameters.insert(name.clone(), expand_default(&def.index, &sets, default));
        } else {
            return Err(SpecError::ResolutionFailure { name: name.clone() });
        }
    }
    for (name, records) in user_parameters {
        parameters.entry(name).or_insert(records);
    }

    if settings.distance_calculated {
        if let Some(lookups) = lookups {
            fill_process_coordinates(&mut parameters, &sets, lookups)?;
        }
    }

    let mut resolved = Resolved { sets, parameters };
    for derivation in derivations_for(settings) {
        let records = derivation.derive(&resolved)?;
        tracing::debug!(parameter = derivation.name(), records = records.len(), "derived");
        resolved.parameters.insert(derivation.name().to_string(), records);
    }

    Ok(ModelInstance::new(resolved.sets, resolved.parameters))
}

/// Fill the destination coordinate parameters `PX`/`PY` from the process
/// locations in the database, unless the configuration supplied them.
/// Processes without location rows are left to the default-coordinate
/// fallback in the distance derivation.
fn fill_process_coordinates(
    parameters: &mut ParamRecords,
    sets: &SetRecords,
    lookups: &LookupTables,
) -> Result<(), SpecError> {
    if parameters.contains_key("PX") || parameters.contains_key("PY") {
        return Ok(());
    }
    let Some(processes) = sets.get("P_m").filter(|members| !members.is_empty()) else {
        return Ok(());
    };

    let locations =
        mola_db::get_process_locations(lookups.connection(), processes.clone())?;
    let mut px = Vec::new();
    let mut py = Vec::new();
    for row in &locations.rows {
        let (Some(process), Some(lat), Some(lon)) =
            (row[0].as_str(), row[3].as_f64(), row[4].as_f64())
        else {
            continue;
        };
        px.push(crate::IndexedValue { index: vec![process.to_string()], value: lat });
        py.push(crate::IndexedValue { index: vec![process.to_string()], value: lon });
    }
    parameters.insert("PX".to_string(), px);
    parameters.insert("PY".to_string(), py);
    Ok(())
}

/// The full LCA model declaration: database-backed process, flow and
/// impact-category sets, user-supplied demand locations and time periods,
/// and the calculated transport-distance parameter.
#[derive(Debug)]
pub struct GeneralSpecification {
    pub settings: Settings,
    template: Template,
}

impl GeneralSpecification {
    pub fn new(settings: Settings) -> Self {
        let mut template = Template::default();
        template.sets.insert(
            "P_m".to_string(),
            SetDef::lookup("Material processes", "P_m"),
        );
        template.sets.insert(
            "P_s".to_string(),
            SetDef::lookup("Service processes", "P_s"),
        );
        template.sets.insert(
            "P_t".to_string(),
            SetDef::lookup("Transport processes", "P_t"),
        );
        template.sets.insert(
            "F_m".to_string(),
            SetDef::lookup("Product flows of material processes", "F_m"),
        );
        template.sets.insert(
            "E".to_string(),
            SetDef::lookup("Elementary flows", "E"),
        );
        template.sets.insert(
            "KPI".to_string(),
            SetDef::lookup("Impact categories", "KPI"),
        );
        template.sets.insert("K".to_string(), SetDef::user("Demand locations"));
        template.sets.insert("T".to_string(), SetDef::user("Time periods"));

        template.parameters.insert(
            "Demand".to_string(),
            ParameterDef::with_default("Demand per location and period", &["K", "T"], 0.0),
        );
        template.parameters.insert(
            "C".to_string(),
            ParameterDef::with_default(
                "Conversion factor per material process",
                &["P_m", "K", "T"],
                0.0,
            ),
        );
        template.parameters.insert(
            "X".to_string(),
            ParameterDef::with_default("Demand location latitude", &["K", "T"], 0.0),
        );
        template.parameters.insert(
            "Y".to_string(),
            ParameterDef::with_default("Demand location longitude", &["K", "T"], 0.0),
        );
        template.parameters.insert(
            "PX".to_string(),
            ParameterDef::calculated("Process location latitude", &["P_m"]),
        );
        template.parameters.insert(
            "PY".to_string(),
            ParameterDef::calculated("Process location longitude", &["P_m"]),
        );
        template.parameters.insert(
            "dd".to_string(),
            ParameterDef::calculated("Transport distance", &["K", "T", "P_m"]),
        );

        Self { settings, template }
    }
}

impl Specification for GeneralSpecification {
    fn name(&self) -> &'static str {
        "GeneralSpecification"
    }

    fn version(&self) -> &'static str {
        "5"
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    fn template(&self) -> &Template {
        &self.template
    }
}

/// A database-free declaration for small ad hoc models: user sets only,
/// no lookups and no derivations.
#[derive(Debug)]
pub struct SimpleSpecification {
    pub settings: Settings,
    template: Template,
}

impl SimpleSpecification {
    pub fn new(settings: Settings) -> Self {
        let mut template = Template::default();
        template.sets.insert("P".to_string(), SetDef::user("Processes"));
        template.sets.insert("T".to_string(), SetDef::user("Time periods"));
        template.parameters.insert(
            "Demand".to_string(),
            ParameterDef::with_default("Demand per period", &["T"], 0.0),
        );
        template.parameters.insert(
            "Cost".to_string(),
            ParameterDef::with_default("Unit cost per process and period", &["P", "T"], 0.0),
        );
        Self { settings, template }
    }
}

impl Specification for SimpleSpecification {
    fn name(&self) -> &'static str {
        "SimpleSpecification"
    }

    fn version(&self) -> &'static str {
        "1"
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    fn template(&self) -> &Template {
        &self.template
    }
}
