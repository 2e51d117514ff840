//! Node snapshots.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::SnapshotError;
use crate::config::{NoSourcePolicy, SnapshotConfig};
use crate::engine::EngineNode;
use crate::fingerprint::{fingerprint, Fingerprint, OriginatingFunction, SourceInput};
use crate::types::{DependencyKind, Tags, TypeDescriptor};

/// Version reported for nodes without source under [`NoSourcePolicy::Sentinel`].
///
/// SHA-256 of the empty string. Function sources that prepare to empty text
/// (blank, or only comments) fail with
/// [`SourceUnavailable`](SnapshotError::SourceUnavailable) instead of hashing,
/// so a computed node version never equals the sentinel.
pub const EXTERNAL_INPUT_VERSION: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Immutable external view of one engine node.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    name: String,
    output_type: TypeDescriptor,
    tags: Tags,
    is_external_input: bool,
    originating_functions: Vec<Arc<dyn OriginatingFunction>>,
    documentation: Option<String>,
    required_dependencies: BTreeSet<String>,
    optional_dependencies: BTreeSet<String>,
    config: SnapshotConfig,
    version: OnceLock<Result<Fingerprint, SnapshotError>>,
}

/// JSON-ready rendering of a [`NodeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node name.
    pub name: String,
    /// Node tags.
    pub tags: Tags,
    /// Output type display string; empty when the type has none.
    pub output_type: String,
    /// Required dependency names, sorted.
    pub required_dependencies: Vec<String>,
    /// Optional dependency names, sorted.
    pub optional_dependencies: Vec<String>,
    /// Full source of the primary originating function.
    pub source: Option<String>,
    /// Node documentation.
    pub documentation: Option<String>,
    /// Node version.
    pub version: Fingerprint,
}

impl NodeSnapshot {
    /// Snapshot an engine node with the default configuration.
    pub fn from_node<N: EngineNode>(node: &N) -> Self {
        Self::from_node_with_config(node, &SnapshotConfig::default())
    }

    /// Snapshot an engine node.
    ///
    /// Inputs of kind required and optional are split into the two
    /// dependency sets; other kinds are left out of both. A name reported
    /// under both kinds is kept as required only.
    pub fn from_node_with_config<N: EngineNode>(node: &N, config: &SnapshotConfig) -> Self {
        let mut required_dependencies = BTreeSet::new();
        let mut optional_dependencies = BTreeSet::new();

        for (dependency, input) in node.input_types() {
            match &input.kind {
                DependencyKind::Required => {
                    optional_dependencies.remove(dependency);
                    required_dependencies.insert(dependency.to_string());
                }
                DependencyKind::Optional => {
                    if !required_dependencies.contains(dependency) {
                        optional_dependencies.insert(dependency.to_string());
                    }
                }
                DependencyKind::Other(kind) => {
                    tracing::trace!(
                        node = node.name(),
                        dependency,
                        kind = %kind,
                        "dependency kind excluded from classification"
                    );
                }
            }
        }

        Self {
            name: node.name().to_string(),
            output_type: node.output_type().clone(),
            tags: node.tags().clone(),
            is_external_input: node.is_user_defined(),
            originating_functions: node.originating_functions().to_vec(),
            documentation: node.documentation().map(str::to_string),
            required_dependencies,
            optional_dependencies,
            config: config.clone(),
            version: OnceLock::new(),
        }
    }

    /// Node name, unique within its graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared output type.
    pub fn output_type(&self) -> &TypeDescriptor {
        &self.output_type
    }

    /// Node tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Whether the caller supplies this node's value.
    pub fn is_external_input(&self) -> bool {
        self.is_external_input
    }

    /// Functions defining this node, primary first.
    pub fn originating_functions(&self) -> &[Arc<dyn OriginatingFunction>] {
        &self.originating_functions
    }

    /// Node documentation.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Dependencies the node cannot execute without.
    pub fn required_dependencies(&self) -> &BTreeSet<String> {
        &self.required_dependencies
    }

    /// Dependencies the node can execute without.
    pub fn optional_dependencies(&self) -> &BTreeSet<String> {
        &self.optional_dependencies
    }

    /// Whether `name` is a required or optional dependency of this node.
    pub fn depends_on(&self, name: &str) -> bool {
        self.required_dependencies.contains(name) || self.optional_dependencies.contains(name)
    }

    /// Full source of the primary originating function, if there is one.
    pub fn source(&self) -> Result<Option<&str>, SnapshotError> {
        match self.originating_functions.first() {
            Some(function) => Ok(Some(function.source()?)),
            None => Ok(None),
        }
    }

    /// Version of this node, computed once and cached.
    ///
    /// The fingerprint of the primary originating function's source, with
    /// docstrings and comments stripped unless configured otherwise. Nodes
    /// without functions follow the configured [`NoSourcePolicy`].
    pub fn version(&self) -> Result<&Fingerprint, SnapshotError> {
        self.version
            .get_or_init(|| self.compute_version())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_version(&self) -> Result<Fingerprint, SnapshotError> {
        let Some(primary) = self.originating_functions.first() else {
            return match self.config.no_source_policy {
                NoSourcePolicy::Sentinel => Ok(Fingerprint::new(EXTERNAL_INPUT_VERSION.to_string())),
                NoSourcePolicy::Error => Err(SnapshotError::NoSource {
                    node: self.name.clone(),
                }),
            };
        };
        let source = SourceInput::Function(primary.as_ref());
        Ok(fingerprint(source, self.config.strip_docs_and_comments)?)
    }

    /// Render as a JSON-ready record.
    ///
    /// # Errors
    /// Fails when the version cannot be computed or the primary source is
    /// unavailable.
    pub fn to_record(&self) -> Result<NodeRecord, SnapshotError> {
        Ok(NodeRecord {
            name: self.name.clone(),
            tags: self.tags.clone(),
            output_type: self.output_type.display_name().unwrap_or_default(),
            required_dependencies: self.required_dependencies.iter().cloned().collect(),
            optional_dependencies: self.optional_dependencies.iter().cloned().collect(),
            source: self.source()?.map(str::to_string),
            documentation: self.documentation.clone(),
            version: self.version()?.clone(),
        })
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, SnapshotError> {
        serde_json::to_value(self.to_record()?)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))
    }
}

impl fmt::Display for NodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.output_type)
    }
}
