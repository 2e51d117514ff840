//! Graph snapshots.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::{NodeRecord, NodeSnapshot};
use super::SnapshotError;
use crate::canonical::to_canonical_bytes;
use crate::config::SnapshotConfig;
use crate::engine::EngineGraph;
use crate::fingerprint::Fingerprint;
use crate::SNAPSHOT_SCHEMA_VERSION;

/// Immutable external view of a whole engine graph.
///
/// Nodes keep the engine's iteration order. The graph version does not
/// depend on that order.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    nodes: Vec<NodeSnapshot>,
    version: OnceLock<Result<Fingerprint, SnapshotError>>,
}

/// A node left out of a [`GraphExport`] and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedNode {
    /// Node name.
    pub name: String,
    /// Rendered error.
    pub error: String,
}

/// JSON-ready export of a whole graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    /// Schema version of the export format.
    pub schema_version: String,
    /// Graph version; `None` when any node could not be versioned.
    pub version: Option<Fingerprint>,
    /// When the export was produced.
    pub exported_at: DateTime<Utc>,
    /// Records of every node that could be rendered, in graph order.
    pub nodes: Vec<NodeRecord>,
    /// Nodes that could not be rendered.
    pub degraded: Vec<DegradedNode>,
}

impl GraphExport {
    /// Whether every node was rendered.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }

    /// Serialize to canonical JSON bytes.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        to_canonical_bytes(self)
    }
}

/// Node-level differences between two graph snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDiff {
    /// Nodes only in the newer graph.
    pub added: Vec<String>,
    /// Nodes only in the older graph.
    pub removed: Vec<String>,
    /// Nodes in both whose versions differ.
    pub modified: Vec<String>,
}

impl VersionDiff {
    /// Check if the graphs have identical node versions.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

impl GraphSnapshot {
    /// Snapshot an engine graph with the default configuration.
    pub fn from_graph<G: EngineGraph>(graph: &G) -> Self {
        Self::from_graph_with_config(graph, &SnapshotConfig::default())
    }

    /// Snapshot every node of an engine graph, preserving its order.
    pub fn from_graph_with_config<G: EngineGraph>(graph: &G, config: &SnapshotConfig) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| NodeSnapshot::from_node_with_config(node, config))
            .collect();
        Self {
            nodes,
            version: OnceLock::new(),
        }
    }

    /// Nodes in engine order.
    pub fn nodes(&self) -> &[NodeSnapshot] {
        &self.nodes
    }

    /// Look up a node by name.
    pub fn get(&self, name: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    /// Get number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes whose values the caller supplies.
    pub fn external_inputs(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.nodes.iter().filter(|node| node.is_external_input())
    }

    /// Nodes that list `name` as a required or optional dependency.
    pub fn dependents_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a NodeSnapshot> + 'a {
        self.nodes.iter().filter(move |node| node.depends_on(name))
    }

    /// Version of the whole graph, computed once and cached.
    ///
    /// SHA-256 of the sorted node versions rendered as `['v1', 'v2', ...]`.
    /// Fails with the first node error if any node cannot be versioned.
    pub fn version(&self) -> Result<&Fingerprint, SnapshotError> {
        self.version
            .get_or_init(|| aggregate_version(&self.nodes))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Export every node that can be rendered.
    ///
    /// Nodes that fail are listed in [`GraphExport::degraded`] and the graph
    /// version is omitted; the remaining nodes are still exported.
    pub fn export(&self) -> GraphExport {
        let mut records = Vec::with_capacity(self.nodes.len());
        let mut degraded = Vec::new();

        for node in &self.nodes {
            match node.to_record() {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(node = node.name(), %error, "node excluded from graph export");
                    degraded.push(DegradedNode {
                        name: node.name().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        GraphExport {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            version: self.version().ok().cloned(),
            exported_at: Utc::now(),
            nodes: records,
            degraded,
        }
    }

    /// Compare node versions against an older snapshot of the same dataflow.
    ///
    /// Names in each list are sorted.
    pub fn diff(&self, older: &GraphSnapshot) -> VersionDiff {
        let current: BTreeMap<&str, &NodeSnapshot> =
            self.nodes.iter().map(|node| (node.name(), node)).collect();
        let previous: BTreeMap<&str, &NodeSnapshot> =
            older.nodes.iter().map(|node| (node.name(), node)).collect();

        let mut diff = VersionDiff::default();
        for (name, node) in &current {
            match previous.get(name) {
                None => diff.added.push(name.to_string()),
                Some(old) if old.version() != node.version() => diff.modified.push(name.to_string()),
                Some(_) => {}
            }
        }
        for name in previous.keys() {
            if !current.contains_key(name) {
                diff.removed.push(name.to_string());
            }
        }
        diff
    }
}

fn aggregate_version(nodes: &[NodeSnapshot]) -> Result<Fingerprint, SnapshotError> {
    let mut versions = nodes
        .iter()
        .map(|node| node.version().map(Fingerprint::as_str))
        .collect::<Result<Vec<_>, _>>()?;
    versions.sort_unstable();

    let quoted: Vec<String> = versions.iter().map(|v| format!("'{}'", v)).collect();
    Ok(Fingerprint::of_text(&format!("[{}]", quoted.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoSourcePolicy;
    use crate::engine::{FunctionGraph, FunctionNode};
    use crate::types::{DependencyKind, TypeDescriptor};

    fn node(name: &str, body: &str) -> FunctionNode {
        FunctionNode::new(name, TypeDescriptor::named("int"))
            .with_source(format!("m.{}", name), format!("def {}():\n    return {}\n", name, body))
    }

    fn graph(nodes: Vec<FunctionNode>) -> GraphSnapshot {
        GraphSnapshot::from_graph(&FunctionGraph::from_nodes(nodes).unwrap())
    }

    #[test]
    fn test_preserves_engine_order() {
        let snapshot = graph(vec![node("c", "3"), node("a", "1"), node("b", "2")]);
        let names: Vec<&str> = snapshot.nodes().iter().map(NodeSnapshot::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.get("a").is_some());
    }

    #[test]
    fn test_version_order_independent() {
        let first = graph(vec![node("a", "1"), node("b", "2"), node("c", "3")]);
        let second = graph(vec![node("c", "3"), node("a", "1"), node("b", "2")]);
        assert_eq!(first.version().unwrap(), second.version().unwrap());
    }

    #[test]
    fn test_version_sensitive_to_node_source() {
        let first = graph(vec![node("a", "1"), node("b", "2")]);
        let second = graph(vec![node("a", "1"), node("b", "20")]);
        assert_ne!(first.version().unwrap(), second.version().unwrap());
    }

    #[test]
    fn test_version_text_form() {
        let snapshot = graph(vec![node("b", "2"), node("a", "1")]);
        let mut versions: Vec<String> = snapshot
            .nodes()
            .iter()
            .map(|n| n.version().unwrap().to_string())
            .collect();
        versions.sort();
        let text = format!("['{}', '{}']", versions[0], versions[1]);
        assert_eq!(snapshot.version().unwrap(), &Fingerprint::of_text(&text));
    }

    #[test]
    fn test_empty_graph_version() {
        let snapshot = graph(vec![]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.version().unwrap(), &Fingerprint::of_text("[]"));
    }

    #[test]
    fn test_dependents_and_inputs() {
        let snapshot = graph(vec![
            FunctionNode::external_input("x", TypeDescriptor::named("int")),
            node("y", "x + 1").with_input("x", TypeDescriptor::named("int"), DependencyKind::Required),
            node("z", "x").with_input("x", TypeDescriptor::named("int"), DependencyKind::Optional),
            node("w", "0"),
        ]);

        let dependents: Vec<&str> = snapshot.dependents_of("x").map(NodeSnapshot::name).collect();
        assert_eq!(dependents, vec!["y", "z"]);
        let inputs: Vec<&str> = snapshot.external_inputs().map(NodeSnapshot::name).collect();
        assert_eq!(inputs, vec!["x"]);
    }

    #[test]
    fn test_export_degrades_per_node() {
        let config = SnapshotConfig::default().with_no_source_policy(NoSourcePolicy::Error);
        let engine = FunctionGraph::from_nodes(vec![
            node("a", "1"),
            FunctionNode::external_input("x", TypeDescriptor::named("int")),
            node("b", "2"),
        ])
        .unwrap();
        let snapshot = GraphSnapshot::from_graph_with_config(&engine, &config);

        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.version().is_err());

        let export = snapshot.export();
        assert!(!export.is_complete());
        assert_eq!(export.version, None);
        assert_eq!(export.nodes.len(), 2);
        assert_eq!(export.degraded.len(), 1);
        assert_eq!(export.degraded[0].name, "x");
    }

    #[test]
    fn test_export_complete() {
        let snapshot = graph(vec![node("a", "1"), node("b", "2")]);
        let export = snapshot.export();

        assert!(export.is_complete());
        assert_eq!(export.schema_version, SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(export.version.as_ref(), Some(snapshot.version().unwrap()));
        let names: Vec<&str> = export.nodes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let bytes = export.to_canonical_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["nodes"][1]["name"], "b");
    }

    #[test]
    fn test_diff() {
        let older = graph(vec![node("a", "1"), node("b", "2"), node("c", "3")]);
        let newer = graph(vec![node("a", "1"), node("b", "22"), node("d", "4")]);

        let diff = newer.diff(&older);
        assert_eq!(diff.added, vec!["d"]);
        assert_eq!(diff.removed, vec!["c"]);
        assert_eq!(diff.modified, vec!["b"]);
        assert!(!diff.is_empty());
        assert!(older.diff(&older).is_empty());
    }
}
