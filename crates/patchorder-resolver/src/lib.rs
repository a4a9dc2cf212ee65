mod alias;
mod error;
mod order;
mod registry;

pub use alias::AliasResolver;
pub use error::{CyclicDependency, RegistrySealed};
pub use registry::PatchRegistry;
