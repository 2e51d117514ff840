//! Interface consumed from the graph-construction engine.
//!
//! The engine owns dependency resolution, type checking and execution. By the
//! time a graph reaches this crate it is finalized: every node's inputs are
//! resolved and classified. Snapshots read a graph only through these traits,
//! so engine internals can evolve without changing the exported view.

pub mod memory;

use std::sync::Arc;

use crate::fingerprint::OriginatingFunction;
use crate::types::{InputDependency, Tags, TypeDescriptor};

/// One computation node as the engine represents it.
pub trait EngineNode {
    /// Name, unique within the graph.
    fn name(&self) -> &str;

    /// Declared output type.
    fn output_type(&self) -> &TypeDescriptor;

    /// Free-form tags.
    fn tags(&self) -> &Tags;

    /// Whether the caller supplies this node's value.
    fn is_user_defined(&self) -> bool;

    /// Functions defining this node, primary first. Empty for pure inputs.
    fn originating_functions(&self) -> &[Arc<dyn OriginatingFunction>];

    /// Human-readable description.
    fn documentation(&self) -> Option<&str>;

    /// Input table: dependency name to its type and kind.
    fn input_types(&self) -> impl Iterator<Item = (&str, &InputDependency)>;
}

/// A finalized graph of engine nodes.
pub trait EngineGraph {
    /// Node representation.
    type Node: EngineNode;

    /// Nodes in the engine's iteration order.
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;
}

pub use memory::{EngineError, FunctionGraph, FunctionNode};
