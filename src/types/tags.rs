//! Free-form node tags.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Node tags keyed by name. Ordered so exports are stable.
pub type Tags = BTreeMap<String, TagValue>;

/// A tag value: a single string or an ordered list of strings.
///
/// Serializes untagged, so `"owner": "data"` and `"teams": ["a", "b"]`
/// both round-trip as plain JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// Single value.
    One(String),
    /// Ordered list of values.
    Many(Vec<String>),
}

impl TagValue {
    /// All values as a slice-like iterator, whichever form this is.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }

    /// Whether `value` is this tag's value or one of its values.
    pub fn contains(&self, value: &str) -> bool {
        self.values().any(|v| v == value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for TagValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(value) => write!(f, "{}", value),
            Self::Many(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}
