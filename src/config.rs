//! Snapshot configuration.

use serde::{Deserialize, Serialize};

/// What a node with no originating function reports as its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSourcePolicy {
    /// Report [`EXTERNAL_INPUT_VERSION`](crate::snapshot::EXTERNAL_INPUT_VERSION).
    #[default]
    Sentinel,
    /// Fail with [`SnapshotError::NoSource`](crate::snapshot::SnapshotError::NoSource).
    Error,
}

/// Configuration applied when snapshotting nodes.
///
/// Loadable from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Remove docstrings and comments before hashing node sources.
    pub strip_docs_and_comments: bool,
    /// Versioning policy for nodes without source.
    pub no_source_policy: NoSourcePolicy,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            strip_docs_and_comments: true,
            no_source_policy: NoSourcePolicy::Sentinel,
        }
    }
}

impl SnapshotConfig {
    /// Set whether node sources are normalized before hashing.
    pub fn with_strip(mut self, strip: bool) -> Self {
        self.strip_docs_and_comments = strip;
        self
    }

    /// Set the policy for nodes without source.
    pub fn with_no_source_policy(mut self, policy: NoSourcePolicy) -> Self {
        self.no_source_policy = policy;
        self
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
