use std::fmt;

/// Dependency expansion reached a patch that is still being expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicDependency {
    pub patch: String,
    pub dependency: String,
}

impl fmt::Display for CyclicDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cyclic dependency during patch installation: '{}' depends on '{}' which is still being resolved",
            self.patch, self.dependency
        )
    }
}

impl std::error::Error for CyclicDependency {}

/// A patch was registered after an order had already been computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySealed {
    pub patch: String,
}

impl fmt::Display for RegistrySealed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot register patch '{}': patch order was already computed",
            self.patch
        )
    }
}

impl std::error::Error for RegistrySealed {}
