//! External views of an engine graph.
//!
//! ```text
//! EngineGraph → GraphSnapshot::from_graph → NodeSnapshot::from_node (per node)
//!                     │                            │
//!                 version()                    version()
//!       SHA256(['v1', 'v2', ...] sorted)     fingerprint(primary source, strip)
//! ```
//!
//! ## Guarantees
//!
//! - Snapshots never expose engine types; they copy what callers may see.
//! - `version()` is computed on first access and cached for the snapshot's
//!   lifetime. Concurrent first reads are safe; the computation is pure.
//! - A graph version is independent of node order.
//! - One node failing to version never prevents snapshotting or exporting
//!   the others.

pub mod node;
pub mod graph;

pub use node::{NodeRecord, NodeSnapshot, EXTERNAL_INPUT_VERSION};
pub use graph::{DegradedNode, GraphExport, GraphSnapshot, VersionDiff};

use crate::fingerprint::SourceUnavailableError;

/// Error raised while versioning or rendering a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The primary originating function has no source text.
    #[error(transparent)]
    SourceUnavailable(#[from] SourceUnavailableError),

    /// The node has no originating function and the policy forbids a sentinel.
    #[error("Node `{node}` has no originating function to version")]
    NoSource {
        /// Name of the node.
        node: String,
    },

    /// A record could not be converted to JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
