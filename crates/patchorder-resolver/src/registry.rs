use anyhow::Result;
use indexmap::IndexMap;
use patchorder_core::{PatchCatalog, PatchLedger};

use crate::alias::AliasResolver;
use crate::error::RegistrySealed;

/// Collects patch registrations and derives install and uninstall orders.
///
/// Every registration must happen before the first call to
/// [`PatchRegistry::install_order`] or [`PatchRegistry::uninstall_order`].
/// Both orders are computed once and cached; afterwards the registry is sealed
/// and [`PatchRegistry::register`] fails with [`RegistrySealed`].
pub struct PatchRegistry<'a> {
    pub(crate) catalog: &'a dyn PatchCatalog,
    pub(crate) ledger: &'a dyn PatchLedger,
    pub(crate) aliases: &'a AliasResolver<'a>,
    /// Pending patches, requested name to canonical name.
    pub(crate) patches: IndexMap<String, String>,
    /// Already applied patches, requested name to canonical name.
    pub(crate) applied: IndexMap<String, String>,
    /// Canonical name to the applied patches that depend on it.
    pub(crate) dependents: IndexMap<String, Vec<String>>,
    install_order: Option<Vec<String>>,
    uninstall_order: Option<Vec<String>>,
}

impl<'a> PatchRegistry<'a> {
    pub fn new(
        catalog: &'a dyn PatchCatalog,
        ledger: &'a dyn PatchLedger,
        aliases: &'a AliasResolver<'a>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            aliases,
            patches: IndexMap::new(),
            applied: IndexMap::new(),
            dependents: IndexMap::new(),
            install_order: None,
            uninstall_order: None,
        }
    }

    /// Registers `name` and returns its canonical name, or `None` when the
    /// ledger reports it as applied.
    pub fn register(&mut self, name: &str) -> Result<Option<String>> {
        if self.is_sealed() {
            return Err(RegistrySealed {
                patch: name.to_string(),
            }
            .into());
        }
        self.register_patch(name)
    }

    pub fn register_all<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        for name in names {
            self.register(name.as_ref())?;
        }
        Ok(())
    }

    pub(crate) fn register_patch(&mut self, name: &str) -> Result<Option<String>> {
        let canonical = self.aliases.resolve(name);

        if self.ledger.is_applied(&canonical)? {
            tracing::trace!(patch = name, canonical = canonical.as_str(), "patch already applied");
            self.register_dependents(&canonical)?;
            self.applied.insert(name.to_string(), canonical);
            return Ok(None);
        }

        if let Some(existing) = self.patches.get(name) {
            return Ok(Some(existing.clone()));
        }

        self.patches.insert(name.to_string(), canonical.clone());
        Ok(Some(canonical))
    }

    fn register_dependents(&mut self, canonical: &str) -> Result<()> {
        for dependency in self.catalog.dependencies(canonical)? {
            let dependency = self.aliases.resolve(&dependency);
            let dependents = self.dependents.entry(dependency).or_default();
            if !dependents.iter().any(|dependent| dependent == canonical) {
                dependents.push(canonical.to_string());
            }
        }
        Ok(())
    }

    /// Pending registrations, requested name to canonical name, in
    /// registration order.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patches
            .iter()
            .map(|(name, canonical)| (name.as_str(), canonical.as_str()))
    }

    /// Applied registrations not yet drained by [`PatchRegistry::uninstall_order`].
    pub fn applied(&self) -> impl Iterator<Item = (&str, &str)> {
        self.applied
            .iter()
            .map(|(name, canonical)| (name.as_str(), canonical.as_str()))
    }

    pub fn dependents_of(&self, canonical: &str) -> &[String] {
        self.dependents
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_sealed(&self) -> bool {
        self.install_order.is_some() || self.uninstall_order.is_some()
    }

    /// Canonical names in install order: every patch after all of its
    /// unapplied dependencies.
    pub fn install_order(&mut self) -> Result<&[String]> {
        if self.install_order.is_none() {
            let order = self.compute_install_order()?;
            self.install_order = Some(order);
        }
        Ok(self.install_order.as_deref().unwrap_or_default())
    }

    /// Canonical names of applied patches in uninstall order: every patch
    /// after all of its applied dependents.
    pub fn uninstall_order(&mut self) -> &[String] {
        if self.uninstall_order.is_none() {
            let order = self.compute_uninstall_order();
            self.uninstall_order = Some(order);
        }
        self.uninstall_order.as_deref().unwrap_or_default()
    }
}
