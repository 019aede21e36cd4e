//! Module providing JSON IO for rbars models
//!
//! A model definition is a directory holding three files: `metabolism.json`
//! (metabolites and reactions), `machinery.json` (enzymes, process
//! machineries and the protein density bound), and `medium.json` (nutrient
//! concentrations).
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell_model::enzyme::Enzyme;
use crate::cell_model::metabolite::Metabolite;
use crate::cell_model::model::RbaModel;
use crate::cell_model::process::Process;
use crate::cell_model::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};

/// File holding metabolites and reactions
pub const METABOLISM_FILE: &str = "metabolism.json";
/// File holding enzymes, processes and the density bound
pub const MACHINERY_FILE: &str = "machinery.json";
/// File holding the medium composition
pub const MEDIUM_FILE: &str = "medium.json";

// region JSON Model
/// Serialized form of the metabolic network half of a model
#[derive(Serialize, Deserialize)]
struct JsonMetabolism {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    version: Option<String>,
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    boundary: bool,
    #[serde(default)]
    biomass_demand: f64,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    #[serde(default)]
    name: Option<String>,
    stoichiometry: IndexMap<String, f64>,
    #[serde(default)]
    lower_bound: Option<f64>,
    #[serde(default)]
    upper_bound: Option<f64>,
    #[serde(default)]
    enzyme: Option<String>,
    #[serde(default)]
    transport: Option<JsonTransport>,
}

#[derive(Serialize, Deserialize)]
struct JsonTransport {
    nutrient: String,
    saturation_constant: f64,
}

/// Serialized form of the proteome half of a model
#[derive(Serialize, Deserialize)]
struct JsonMachinery {
    enzymes: Vec<JsonEnzyme>,
    processes: Vec<JsonProcess>,
    #[serde(default)]
    protein_density_bound: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct JsonEnzyme {
    id: String,
    reaction: String,
    forward_efficiency: f64,
    #[serde(default)]
    reverse_efficiency: f64,
    #[serde(default)]
    composition: IndexMap<String, f64>,
    #[serde(default)]
    molecular_weight: f64,
}

#[derive(Serialize, Deserialize)]
struct JsonProcess {
    id: String,
    #[serde(default)]
    name: Option<String>,
    capacity_rate: f64,
    #[serde(default)]
    composition: IndexMap<String, f64>,
    #[serde(default)]
    molecular_weight: f64,
}
// endregion JSON Model

// region Conversions
impl From<JsonMetabolite> for Metabolite {
    fn from(metabolite: JsonMetabolite) -> Self {
        Self {
            id: metabolite.id,
            name: metabolite.name,
            boundary: metabolite.boundary,
            biomass_demand: metabolite.biomass_demand,
        }
    }
}

impl From<&Metabolite> for JsonMetabolite {
    fn from(metabolite: &Metabolite) -> Self {
        Self {
            id: metabolite.id.clone(),
            name: metabolite.name.clone(),
            boundary: metabolite.boundary,
            biomass_demand: metabolite.biomass_demand,
        }
    }
}

impl From<JsonEnzyme> for Enzyme {
    fn from(enzyme: JsonEnzyme) -> Self {
        Self {
            id: enzyme.id,
            reaction: enzyme.reaction,
            forward_efficiency: enzyme.forward_efficiency,
            reverse_efficiency: enzyme.reverse_efficiency,
            composition: enzyme.composition,
            molecular_weight: enzyme.molecular_weight,
        }
    }
}

impl From<&Enzyme> for JsonEnzyme {
    fn from(enzyme: &Enzyme) -> Self {
        Self {
            id: enzyme.id.clone(),
            reaction: enzyme.reaction.clone(),
            forward_efficiency: enzyme.forward_efficiency,
            reverse_efficiency: enzyme.reverse_efficiency,
            composition: enzyme.composition.clone(),
            molecular_weight: enzyme.molecular_weight,
        }
    }
}

impl From<JsonProcess> for Process {
    fn from(process: JsonProcess) -> Self {
        Self {
            id: process.id,
            name: process.name,
            capacity_rate: process.capacity_rate,
            composition: process.composition,
            molecular_weight: process.molecular_weight,
        }
    }
}

impl From<&Process> for JsonProcess {
    fn from(process: &Process) -> Self {
        Self {
            id: process.id.clone(),
            name: process.name.clone(),
            capacity_rate: process.capacity_rate,
            composition: process.composition.clone(),
            molecular_weight: process.molecular_weight,
        }
    }
}
// endregion Conversions

impl RbaModel {
    /// Read a model definition directory into an RbaModel
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<RbaModel, JsonError> {
        let dir = dir.as_ref();
        let metabolism: JsonMetabolism = read_json_file(&dir.join(METABOLISM_FILE))?;
        let machinery: JsonMachinery = read_json_file(&dir.join(MACHINERY_FILE))?;
        let medium: IndexMap<String, f64> = read_json_file(&dir.join(MEDIUM_FILE))?;

        let mut model = RbaModel::new_empty();
        model.id = metabolism.id;
        model.version = metabolism.version;
        for metabolite in metabolism.metabolites {
            model.add_metabolite(Metabolite::from(metabolite));
        }
        for reaction in metabolism.reactions {
            model.add_reaction(build_reaction(reaction)?);
        }
        for enzyme in machinery.enzymes {
            model.add_enzyme(Enzyme::from(enzyme));
        }
        for process in machinery.processes {
            model.add_process(Process::from(process));
        }
        model.protein_density_bound = machinery.protein_density_bound.unwrap_or(f64::INFINITY);
        model.set_medium(medium);
        Ok(model)
    }

    /// Write the model as a definition directory
    pub fn write_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(), JsonError> {
        let dir = dir.as_ref();
        let metabolism = JsonMetabolism {
            id: self.id.clone(),
            version: self.version.clone(),
            metabolites: self.metabolites.values().map(JsonMetabolite::from).collect(),
            reactions: self
                .reactions
                .values()
                .map(|reaction| JsonReaction {
                    id: reaction.id.clone(),
                    name: reaction.name.clone(),
                    stoichiometry: reaction.stoichiometry.clone(),
                    lower_bound: Some(reaction.lower_bound),
                    upper_bound: Some(reaction.upper_bound),
                    enzyme: reaction.enzyme.clone(),
                    transport: reaction.transport.as_ref().map(|transport| JsonTransport {
                        nutrient: transport.nutrient.clone(),
                        saturation_constant: transport.saturation_constant,
                    }),
                })
                .collect(),
        };
        let machinery = JsonMachinery {
            enzymes: self.enzymes.values().map(JsonEnzyme::from).collect(),
            processes: self.processes.values().map(JsonProcess::from).collect(),
            protein_density_bound: if self.protein_density_bound.is_finite() {
                Some(self.protein_density_bound)
            } else {
                None
            },
        };
        fs::write(
            dir.join(METABOLISM_FILE),
            serde_json::to_string_pretty(&metabolism)?,
        )?;
        fs::write(
            dir.join(MACHINERY_FILE),
            serde_json::to_string_pretty(&machinery)?,
        )?;
        fs::write(
            dir.join(MEDIUM_FILE),
            serde_json::to_string_pretty(self.medium())?,
        )?;
        Ok(())
    }
}

/// Convert a serialized reaction, falling back to the configured default bounds
fn build_reaction(reaction: JsonReaction) -> Result<Reaction, JsonError> {
    let mut builder = ReactionBuilder::default();
    builder
        .id(reaction.id)
        .name(reaction.name)
        .stoichiometry(reaction.stoichiometry)
        .enzyme(reaction.enzyme)
        .transport(reaction.transport.map(|transport| {
            crate::cell_model::reaction::Transport {
                nutrient: transport.nutrient,
                saturation_constant: transport.saturation_constant,
            }
        }));
    if let Some(lower_bound) = reaction.lower_bound {
        builder.lower_bound(lower_bound);
    }
    if let Some(upper_bound) = reaction.upper_bound {
        builder.upper_bound(upper_bound);
    }
    Ok(builder.build()?)
}

/// Read and deserialize one model file
fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, JsonError> {
    let data = fs::read_to_string(path)
        .map_err(|err| JsonError::UnableToRead(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&data)
        .map_err(|err| JsonError::UnableToParse(format!("{}: {}", path.display(), err)))
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file: {0}")]
    UnableToRead(String),
    #[error("Unable to parse json: {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Serde json error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
