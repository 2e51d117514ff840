//! Input dependency classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::output_type::TypeDescriptor;

/// How a node depends on one of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The node cannot execute without this input.
    Required,
    /// The node falls back to a default when the input is absent.
    Optional,
    /// Any other kind the engine reports; excluded from classification.
    Other(String),
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Optional => write!(f, "optional"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// One entry of a node's input table: the input's type and dependency kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDependency {
    /// Declared type of the input.
    pub input_type: TypeDescriptor,
    /// Dependency kind.
    pub kind: DependencyKind,
}

impl InputDependency {
    /// Create an input entry.
    pub fn new(input_type: TypeDescriptor, kind: DependencyKind) -> Self {
        Self { input_type, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(DependencyKind::Required.to_string(), "required");
        assert_eq!(DependencyKind::Other("config".to_string()).to_string(), "config");
    }
}
