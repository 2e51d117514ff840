//! Declared node output types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A node's declared output type, as described by the graph engine.
///
/// Rendering follows the source language's annotation syntax, e.g.
/// `Dict[str, int]`. An opaque type, or a generic with an opaque argument,
/// has no display form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// A plain named type (`int`, `pd.Series`).
    Named(String),
    /// A parameterized type (`List[int]`).
    Generic {
        /// Base type name.
        base: String,
        /// Type arguments in order.
        args: Vec<TypeDescriptor>,
    },
    /// A type the engine cannot describe.
    #[default]
    Opaque,
}

impl TypeDescriptor {
    /// A plain named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// A parameterized type.
    pub fn generic(base: impl Into<String>, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Generic {
            base: base.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Display form, or `None` when any part of the type is opaque.
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Named(name) => Some(name.clone()),
            Self::Generic { base, args } => {
                let args = args
                    .iter()
                    .map(Self::display_name)
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("{}[{}]", base, args.join(", ")))
            }
            Self::Opaque => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name().unwrap_or_default())
    }
}
