//! # dataflow-snapshot
//!
//! Content-addressable external snapshots of computation dependency graphs.
//!
//! A graph-construction engine resolves user-authored functions into a graph
//! of computation nodes. This crate turns that finalized graph into a stable
//! view callers can depend on:
//!
//! > Which nodes exist, what do they depend on, and has their code changed?
//!
//! ## Core Contract
//!
//! 1. Each node gets a **version**: the SHA-256 of its primary originating
//!    function's source, with docstrings and comments stripped
//! 2. The graph gets a **version**: the SHA-256 of its sorted node versions
//! 3. Each node renders to a JSON-ready record (name, type, tags, docs,
//!    dependency classification, source, version)
//!
//! ## Architecture
//!
//! ```text
//! EngineGraph → GraphSnapshot → NodeSnapshot → fingerprint → normalize → tree-sitter
//!                    ↓               ↓
//!              graph version    NodeRecord (JSON)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same source text → same node version
//! - Docstring or comment edits → same node version
//! - Node order → no effect on the graph version
//!
//! Versions are textual fingerprints, not semantic ones: logically equivalent
//! but differently written code gets a different version.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod source;
pub mod canonical;
pub mod fingerprint;
pub mod config;
pub mod engine;
pub mod snapshot;

// Re-exports
pub use types::{DependencyKind, InputDependency, TagValue, Tags, TypeDescriptor};
pub use source::{normalize, NormalizationError};
pub use fingerprint::{
    fingerprint, hash_text, Fingerprint, FunctionSource, OriginatingFunction, SourceInput,
    SourceUnavailableError,
};
pub use config::{NoSourcePolicy, SnapshotConfig};
pub use engine::{EngineError, EngineGraph, EngineNode, FunctionGraph, FunctionNode};
pub use snapshot::{
    DegradedNode, GraphExport, GraphSnapshot, NodeRecord, NodeSnapshot, SnapshotError,
    VersionDiff, EXTERNAL_INPUT_VERSION,
};
pub use canonical::{sha256_hex, to_canonical_bytes};

/// Schema version of exported records.
/// Increment on breaking changes to `NodeRecord` or `GraphExport`.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "1.0.0";
