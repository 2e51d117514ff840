//! In-memory engine graph.
//!
//! A plain owned representation of a finalized graph, for engines that hand
//! over their nodes by value and for tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{EngineGraph, EngineNode};
use crate::fingerprint::{FunctionSource, OriginatingFunction};
use crate::types::{DependencyKind, InputDependency, TagValue, Tags, TypeDescriptor};

/// Error type for in-memory graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A node with this name is already in the graph.
    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),
}

/// A node built from one or more source functions, or a caller-supplied input.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    name: String,
    output_type: TypeDescriptor,
    tags: Tags,
    user_defined: bool,
    functions: Vec<Arc<dyn OriginatingFunction>>,
    documentation: Option<String>,
    inputs: BTreeMap<String, InputDependency>,
}

impl FunctionNode {
    /// Create a computed node with no functions, tags or inputs yet.
    pub fn new(name: impl Into<String>, output_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            output_type,
            tags: Tags::new(),
            user_defined: false,
            functions: Vec::new(),
            documentation: None,
            inputs: BTreeMap::new(),
        }
    }

    /// Create a node whose value the caller supplies.
    pub fn external_input(name: impl Into<String>, output_type: TypeDescriptor) -> Self {
        Self {
            user_defined: true,
            ..Self::new(name, output_type)
        }
    }

    /// Append an originating function. The first one added is primary.
    pub fn with_function(mut self, function: Arc<dyn OriginatingFunction>) -> Self {
        self.functions.push(function);
        self
    }

    /// Append an originating function from its name and source text.
    pub fn with_source(self, qualified_name: impl Into<String>, source: impl Into<String>) -> Self {
        self.with_function(Arc::new(FunctionSource::new(qualified_name, source)))
    }

    /// Set a tag, replacing any previous value under `key`.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Set the documentation string.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Add an input, replacing any previous entry with the same name.
    pub fn with_input(
        mut self,
        name: impl Into<String>,
        input_type: TypeDescriptor,
        kind: DependencyKind,
    ) -> Self {
        self.inputs.insert(name.into(), InputDependency::new(input_type, kind));
        self
    }
}

impl EngineNode for FunctionNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_type(&self) -> &TypeDescriptor {
        &self.output_type
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    fn originating_functions(&self) -> &[Arc<dyn OriginatingFunction>] {
        &self.functions
    }

    fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    fn input_types(&self) -> impl Iterator<Item = (&str, &InputDependency)> {
        self.inputs.iter().map(|(name, input)| (name.as_str(), input))
    }
}

/// Finalized graph keeping nodes in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FunctionGraph {
    nodes: Vec<FunctionNode>,
    /// Node name -> position in `nodes`.
    index: BTreeMap<String, usize>,
}

impl FunctionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes, rejecting duplicate names.
    pub fn from_nodes(nodes: impl IntoIterator<Item = FunctionNode>) -> Result<Self, EngineError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        Ok(graph)
    }

    /// Add a node at the end of the iteration order.
    pub fn add_node(&mut self, node: FunctionNode) -> Result<(), EngineError> {
        if self.index.contains_key(&node.name) {
            return Err(EngineError::DuplicateNode(node.name));
        }
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Look up a node by name.
    pub fn get(&self, name: &str) -> Option<&FunctionNode> {
        self.index.get(name).map(|&idx| &self.nodes[idx])
    }

    /// Get number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl EngineGraph for FunctionGraph {
    type Node = FunctionNode;

    fn nodes(&self) -> impl Iterator<Item = &FunctionNode> {
        self.nodes.iter()
    }
}
