use crate::{
    error::CrumbsError,
    freeze::FreezeDestination,
    list_index::ListIndexOptions,
    properties::{Direction, Hierarchy, HierarchyIdx, ImpliedKind},
    trail::TrailOptions,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// Everything the graph engine and its query builders read from configuration.
///
/// ```toml
/// [[hierarchies]]
/// dirs = { up = ["parent"], same = ["sibling"], down = ["child"] }
/// implied_relationships = { same_parent_is_sibling = true }
///
/// [trail]
/// index_notes = ["index.md"]
/// selection = "shortest"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub freeze_destination: FreezeDestination,
    pub hierarchies: Vec<Hierarchy>,
    pub trail: TrailOptions,
    pub list_index: ListIndexOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            freeze_destination: FreezeDestination::default(),
            hierarchies: vec![default_hierarchy()],
            trail: TrailOptions::default(),
            list_index: ListIndexOptions::default(),
        }
    }
}

/// The hierarchy a fresh install starts with: one field per direction, named after it.
pub fn default_hierarchy() -> Hierarchy {
    let mut hierarchy = Hierarchy::default();
    for dir in Direction::all() {
        hierarchy = hierarchy.with_fields(*dir, &[dir.as_str()]);
    }
    hierarchy
        .with_rule(ImpliedKind::SameParentIsSibling)
        .with_rule(ImpliedKind::SameSiblingIsSibling)
}

impl Settings {
    pub fn from_toml_str(src: &str) -> Result<Settings, CrumbsError> {
        let settings: Settings = toml::from_str(src)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, CrumbsError> {
        Ok(toml::to_string(self)?)
    }

    /// Check every hierarchy once, at load time, so later lookups by [HierarchyIdx] are sound.
    pub fn validate(&self) -> Result<(), CrumbsError> {
        for (i, hierarchy) in self.hierarchies.iter().enumerate() {
            hierarchy.validate(HierarchyIdx::try_from(i)?)?;
        }
        Ok(())
    }

    pub fn hierarchy(&self, idx: HierarchyIdx) -> Option<&Hierarchy> {
        self.hierarchies.get(idx.index())
    }

    /// Resolve a field name to the first hierarchy and direction that declare it.
    pub fn resolve_field(&self, field: &str) -> Option<(HierarchyIdx, Direction)> {
        self.hierarchies
            .iter()
            .enumerate()
            .find_map(|(i, h)| {
                let dir = h.direction_of_field(field)?;
                HierarchyIdx::try_from(i).ok().map(|idx| (idx, dir))
            })
    }
}

pub trait ConfigProvider: Send + Sync {
    fn get_settings(&self) -> Result<Settings, CrumbsError>;
    fn set_settings(&self, settings: &Settings) -> Result<(), CrumbsError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_settings(&self) -> Result<Settings, CrumbsError> {
        tracing::debug!("Attempting to read settings from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using default settings.");
            return Ok(Settings::default());
        }
        let content = read_to_string(&self.path)?;
        Settings::from_toml_str(&content)
    }

    fn set_settings(&self, settings: &Settings) -> Result<(), CrumbsError> {
        tracing::debug!("Attempting to write settings to: {:?}", &self.path);
        settings.validate()?;
        write(&self.path, settings.to_toml_string()?)?;
        Ok(())
    }
}
