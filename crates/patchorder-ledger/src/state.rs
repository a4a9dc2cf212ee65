use std::collections::HashSet;

use anyhow::{Context, Result};
use patchorder_core::PatchCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPatchRecord {
    pub name: String,
    pub category: PatchCategory,
    pub applied_at_unix: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AppliedStateFile {
    #[serde(default = "state_file_version")]
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) patches: Vec<AppliedPatchRecord>,
}

impl Default for AppliedStateFile {
    fn default() -> Self {
        Self {
            version: state_file_version(),
            patches: Vec::new(),
        }
    }
}

pub(crate) fn parse_applied_state_file(content: &str) -> Result<AppliedStateFile> {
    let state = toml::from_str::<AppliedStateFile>(content).context("failed parsing applied state")?;
    let expected = state_file_version();
    if state.version != expected {
        anyhow::bail!(
            "unsupported applied state version {} (expected {}): update applied.toml to version {}",
            state.version,
            expected,
            expected
        );
    }

    validate_loaded_patches(&state.patches)?;
    Ok(state)
}

pub(crate) fn state_file_version() -> u32 {
    1
}

pub(crate) fn sort_patches(patches: &mut [AppliedPatchRecord]) {
    patches.sort_by(|left, right| left.name.cmp(&right.name));
}

pub(crate) fn validate_patch_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("invalid patch name: must not be empty");
    }
    if name.chars().any(char::is_control) {
        anyhow::bail!("invalid patch name: '{}'", name.escape_default());
    }

    Ok(())
}

fn validate_loaded_patches(patches: &[AppliedPatchRecord]) -> Result<()> {
    let mut seen_names: HashSet<&str> = HashSet::with_capacity(patches.len());
    for patch in patches {
        validate_patch_name(&patch.name)?;

        if !seen_names.insert(patch.name.as_str()) {
            anyhow::bail!(
                "duplicate patch '{}' in applied.toml: remove one entry",
                patch.name
            );
        }
    }

    Ok(())
}
