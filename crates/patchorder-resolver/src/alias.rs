use std::collections::BTreeSet;

use anyhow::Result;
use indexmap::IndexMap;
use patchorder_core::{PatchArguments, PatchCatalog, PatchCategory};

/// Maps historical patch names to the patch that currently answers to them.
pub struct AliasResolver<'a> {
    catalog: &'a dyn PatchCatalog,
    aliases: IndexMap<String, String>,
    registered_for: BTreeSet<PatchCategory>,
}

impl<'a> AliasResolver<'a> {
    pub fn new(catalog: &'a dyn PatchCatalog) -> Self {
        Self {
            catalog,
            aliases: IndexMap::new(),
            registered_for: BTreeSet::new(),
        }
    }

    pub fn is_registered_for(&self, category: PatchCategory) -> bool {
        self.registered_for.contains(&category)
    }

    /// Collects the aliases declared by `names` once per category.
    ///
    /// Names without a patch definition are skipped. When two patches declare
    /// the same alias the one processed last owns it.
    pub fn register_aliases<S: AsRef<str>>(
        &mut self,
        names: &[S],
        category: PatchCategory,
        arguments: &PatchArguments,
    ) -> Result<()> {
        if self.is_registered_for(category) {
            return Ok(());
        }

        for name in names {
            let name = name.as_ref();
            if !self.catalog.exists(name) {
                tracing::debug!(patch = name, %category, "skipping aliases of undefined patch");
                continue;
            }

            let descriptor = self.catalog.create(name, arguments)?;
            for alias in descriptor.aliases() {
                if let Some(previous) = self.aliases.insert(alias.clone(), name.to_string()) {
                    if previous != name {
                        tracing::debug!(
                            alias = alias.as_str(),
                            previous = previous.as_str(),
                            patch = name,
                            "alias reassigned"
                        );
                    }
                }
            }
        }

        self.registered_for.insert(category);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> String {
        if self.catalog.exists(name) {
            return name.to_string();
        }
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, patch)| (alias.as_str(), patch.as_str()))
    }
}
