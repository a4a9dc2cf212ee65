use serde::{Deserialize, Serialize};

/// The two independent patch domains. Alias registration is tracked per category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatchCategory {
    Data,
    Schema,
}

impl PatchCategory {
    /// Both categories, schema first, in the order they are applied.
    pub const ALL: [PatchCategory; 2] = [Self::Schema, Self::Data];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Schema => "schema",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "data" => Some(Self::Data),
            "schema" => Some(Self::Schema),
            _ => None,
        }
    }
}

impl std::fmt::Display for PatchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
