use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::category::PatchCategory;
use crate::patch::{PatchArguments, PatchCatalog, PatchDescriptor};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchDefinition {
    pub name: String,
    pub category: PatchCategory,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Constructor arguments the factory must be given to instantiate the patch.
    #[serde(default)]
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchManifest {
    #[serde(default)]
    pub patches: Vec<PatchDefinition>,
}

impl PatchManifest {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(input).context("failed to parse patch manifest")?;

        let mut seen_names = HashSet::with_capacity(manifest.patches.len());
        for patch in &manifest.patches {
            if patch.name.trim().is_empty() {
                return Err(anyhow!("patch name must not be empty"));
            }
            if !seen_names.insert(patch.name.as_str()) {
                return Err(anyhow!("duplicate patch definition '{}'", patch.name));
            }
            if patch.dependencies.iter().any(|dep| dep == &patch.name) {
                return Err(anyhow!("patch '{}' depends on itself", patch.name));
            }
            if patch.aliases.iter().any(|alias| alias == &patch.name) {
                return Err(anyhow!("patch '{}' declares itself as an alias", patch.name));
            }
            if patch.aliases.iter().any(|alias| alias.trim().is_empty()) {
                return Err(anyhow!(
                    "alias must not be empty for patch '{}'",
                    patch.name
                ));
            }
        }

        Ok(manifest)
    }

    pub fn get(&self, name: &str) -> Option<&PatchDefinition> {
        self.patches.iter().find(|patch| patch.name == name)
    }

    /// Names of every patch of `category`, in manifest order.
    pub fn names_for(&self, category: PatchCategory) -> Vec<String> {
        self.patches
            .iter()
            .filter(|patch| patch.category == category)
            .map(|patch| patch.name.clone())
            .collect()
    }
}

pub fn load_manifest(path: &Path) -> Result<PatchManifest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read patch manifest: {}", path.display()))?;
    PatchManifest::from_toml_str(&raw)
        .with_context(|| format!("failed to load patch manifest: {}", path.display()))
}

/// [`PatchCatalog`] backed by a parsed [`PatchManifest`].
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    definitions: BTreeMap<String, PatchDefinition>,
}

impl ManifestCatalog {
    pub fn new(manifest: &PatchManifest) -> Self {
        let definitions = manifest
            .patches
            .iter()
            .map(|patch| (patch.name.clone(), patch.clone()))
            .collect();
        Self { definitions }
    }
}

impl PatchCatalog for ManifestCatalog {
    fn exists(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    fn create(&self, name: &str, arguments: &PatchArguments) -> Result<PatchDescriptor> {
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| anyhow!("patch '{name}' is not defined in the manifest"))?;

        for required in &definition.arguments {
            if !arguments.contains_key(required) {
                return Err(anyhow!(
                    "patch '{name}' requires constructor argument '{required}'"
                ));
            }
        }

        Ok(PatchDescriptor {
            name: definition.name.clone(),
            aliases: definition.aliases.iter().cloned().collect(),
            dependencies: definition.dependencies.clone(),
        })
    }

    fn dependencies(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .definitions
            .get(name)
            .map(|definition| definition.dependencies.clone())
            .unwrap_or_default())
    }
}
