use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

/// Category-specific constructor arguments handed to the patch factory.
pub type PatchArguments = BTreeMap<String, String>;

/// An instantiated patch as seen by the ordering engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDescriptor {
    pub name: String,
    pub aliases: BTreeSet<String>,
    pub dependencies: Vec<String>,
}

impl PatchDescriptor {
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Source of patch definitions: existence checks, the factory and static
/// dependency declarations.
pub trait PatchCatalog {
    /// Whether `name` denotes a real, loadable patch definition. Never fails.
    fn exists(&self, name: &str) -> bool;

    fn create(&self, name: &str, arguments: &PatchArguments) -> Result<PatchDescriptor>;

    /// Declared dependencies of `name`, in declaration order.
    ///
    /// Unknown names yield an empty list so that resolution degrades to the raw
    /// identifier instead of failing.
    fn dependencies(&self, name: &str) -> Result<Vec<String>>;
}

/// Read-only view of the applied-patch history.
pub trait PatchLedger {
    fn is_applied(&self, name: &str) -> Result<bool>;
}

impl PatchLedger for BTreeSet<String> {
    fn is_applied(&self, name: &str) -> Result<bool> {
        Ok(self.contains(name))
    }
}
