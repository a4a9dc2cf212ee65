use anyhow::{anyhow, Result};
use patchorder_core::{
    ManifestCatalog, PatchArguments, PatchCategory, PatchLedger, PatchManifest,
};
use patchorder_resolver::{AliasResolver, PatchRegistry};

use crate::CliPatchCategory;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum OrderDirection {
    Install,
    Uninstall,
}

impl OrderDirection {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        }
    }
}

pub(crate) fn selected_categories(category: Option<CliPatchCategory>) -> Vec<PatchCategory> {
    match category {
        Some(category) => vec![category.into()],
        None => PatchCategory::ALL.to_vec(),
    }
}

pub(crate) fn parse_patch_arguments(raw: &[String]) -> Result<PatchArguments> {
    let mut arguments = PatchArguments::new();
    for value in raw {
        let Some((key, argument)) = value.split_once('=') else {
            return Err(anyhow!(
                "invalid patch argument '{value}': expected key=value"
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("invalid patch argument '{value}': key must not be empty"));
        }
        arguments.insert(key.to_string(), argument.to_string());
    }
    Ok(arguments)
}

fn register_aliases<'a>(
    catalog: &'a ManifestCatalog,
    manifest: &PatchManifest,
    categories: &[PatchCategory],
    arguments: &PatchArguments,
) -> Result<AliasResolver<'a>> {
    let mut aliases = AliasResolver::new(catalog);
    for category in categories {
        aliases.register_aliases(&manifest.names_for(*category), *category, arguments)?;
    }
    Ok(aliases)
}

/// Registers every manifest patch of `categories` and returns the requested
/// order of canonical patch names.
pub(crate) fn plan_patch_order(
    manifest: &PatchManifest,
    ledger: &dyn PatchLedger,
    categories: &[PatchCategory],
    arguments: &PatchArguments,
    direction: OrderDirection,
) -> Result<Vec<String>> {
    let catalog = ManifestCatalog::new(manifest);
    let aliases = register_aliases(&catalog, manifest, categories, arguments)?;

    let mut registry = PatchRegistry::new(&catalog, ledger, &aliases);
    for category in categories {
        registry.register_all(&manifest.names_for(*category))?;
    }

    let order = match direction {
        OrderDirection::Install => registry.install_order()?.to_vec(),
        OrderDirection::Uninstall => registry.uninstall_order().to_vec(),
    };
    tracing::debug!(
        direction = direction.as_str(),
        patches = order.len(),
        "patch order computed"
    );
    Ok(order)
}

pub(crate) fn collect_aliases(
    manifest: &PatchManifest,
    categories: &[PatchCategory],
    arguments: &PatchArguments,
) -> Result<Vec<(String, String)>> {
    let catalog = ManifestCatalog::new(manifest);
    let aliases = register_aliases(&catalog, manifest, categories, arguments)?;
    Ok(aliases
        .aliases()
        .map(|(alias, patch)| (alias.to_string(), patch.to_string()))
        .collect())
}

pub(crate) fn resolve_mark_category(
    manifest: &PatchManifest,
    name: &str,
    category: Option<CliPatchCategory>,
) -> Result<PatchCategory> {
    if let Some(category) = category {
        return Ok(category.into());
    }
    manifest
        .get(name)
        .map(|definition| definition.category)
        .ok_or_else(|| {
            anyhow!("patch '{name}' is not defined in the manifest: pass --category to record it")
        })
}
