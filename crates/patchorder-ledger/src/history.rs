use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use patchorder_core::PatchCategory;

use crate::state::{
    parse_applied_state_file, sort_patches, validate_patch_name, AppliedPatchRecord,
    AppliedStateFile,
};

/// Applied-patch history persisted under a state root as `applied.toml`.
#[derive(Debug, Clone)]
pub struct PatchHistory {
    state_root: PathBuf,
}

impl PatchHistory {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
        }
    }

    /// Records `name` as applied. Returns `false` when it already was.
    pub fn mark_applied(&self, name: &str, category: PatchCategory) -> Result<bool> {
        validate_patch_name(name)?;

        let mut state = self.load_state()?;
        if state.patches.iter().any(|existing| existing.name == name) {
            return Ok(false);
        }

        state.patches.push(AppliedPatchRecord {
            name: name.to_string(),
            category,
            applied_at_unix: current_unix_timestamp(),
        });
        self.save_state(&state)?;
        tracing::debug!(patch = name, %category, "patch marked applied");
        Ok(true)
    }

    /// Forgets `name`. Returns `false` when it was not recorded.
    pub fn unmark(&self, name: &str) -> Result<bool> {
        let mut state = self.load_state()?;
        let before = state.patches.len();
        state.patches.retain(|patch| patch.name != name);
        if state.patches.len() == before {
            return Ok(false);
        }

        self.save_state(&state)?;
        tracing::debug!(patch = name, "patch unmarked");
        Ok(true)
    }

    pub fn list(&self) -> Result<Vec<AppliedPatchRecord>> {
        Ok(self.load_state()?.patches)
    }

    /// Snapshot of applied names, usable as a `PatchLedger`.
    pub fn applied_names(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .load_state()?
            .patches
            .into_iter()
            .map(|patch| patch.name)
            .collect())
    }

    fn state_file_path(&self) -> PathBuf {
        self.state_root.join("applied.toml")
    }

    fn load_state(&self) -> Result<AppliedStateFile> {
        let path = self.state_file_path();
        if !path.exists() {
            return Ok(AppliedStateFile::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed reading applied state: {}", path.display()))?;
        let mut state = parse_applied_state_file(&content)
            .with_context(|| format!("failed parsing applied state: {}", path.display()))?;
        sort_patches(&mut state.patches);
        Ok(state)
    }

    fn save_state(&self, state: &AppliedStateFile) -> Result<()> {
        fs::create_dir_all(&self.state_root).with_context(|| {
            format!(
                "failed creating applied state root: {}",
                self.state_root.display()
            )
        })?;

        let path = self.state_file_path();
        let mut state = state.clone();
        sort_patches(&mut state.patches);
        let content = toml::to_string(&state)
            .with_context(|| format!("failed serializing applied state: {}", path.display()))?;
        fs::write(&path, content)
            .with_context(|| format!("failed writing applied state: {}", path.display()))
    }
}

fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
