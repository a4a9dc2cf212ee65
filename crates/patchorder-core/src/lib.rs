mod category;
mod manifest;
mod patch;

pub use category::PatchCategory;
pub use manifest::{load_manifest, ManifestCatalog, PatchDefinition, PatchManifest};
pub use patch::{PatchArguments, PatchCatalog, PatchDescriptor, PatchLedger};

#[cfg(test)]
mod tests;
