use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::model::{short_name, CodeModel};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum NodeType {
    Class,
    Method,
    Function,
    /// A callee or parent class that matches no declaration.
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum EdgeType {
    Contains,
    Inheritance,
    Call,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    pub module: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub edge_type: EdgeType,
    pub source_id: String,
    pub target_id: String,
}

pub type DependencyGraph = Graph<Node, Edge, Directed>;

impl Node {
    pub fn new(id: String, node_type: NodeType) -> Self {
        Self {
            name: short_name(&id).to_string(),
            id,
            node_type,
            module: None,
            summary: None,
        }
    }

    pub fn with_module(mut self, module: String) -> Self {
        self.module = Some(module);
        self
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }
}

impl Edge {
    pub fn new(edge_type: EdgeType, source_id: String, target_id: String) -> Self {
        Self {
            edge_type,
            source_id,
            target_id,
        }
    }
}

pub struct GraphBuilder {
    graph: DependencyGraph,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node.id) {
            return index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        index
    }

    /// Returns the node for `id`, creating an external placeholder if needed.
    pub fn ensure_node(&mut self, id: &str) -> NodeIndex {
        match self.node_map.get(id) {
            Some(&index) => index,
            None => self.add_node(Node::new(id.to_string(), NodeType::External)),
        }
    }

    pub fn add_edge(&mut self, edge: Edge) -> Option<petgraph::graph::EdgeIndex> {
        let source_idx = self.node_map.get(&edge.source_id)?;
        let target_idx = self.node_map.get(&edge.target_id)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, edge))
    }

    /// Adds an edge, creating external placeholders for unknown endpoints.
    pub fn connect(&mut self, edge: Edge) -> petgraph::graph::EdgeIndex {
        let source_idx = self.ensure_node(&edge.source_id);
        let target_idx = self.ensure_node(&edge.target_id);
        self.graph.add_edge(source_idx, target_idx, edge)
    }

    pub fn build(self) -> DependencyGraph {
        self.graph
    }

    pub fn get_node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Projects a model onto a graph: classes contain their methods, classes
/// point at their parent, and every call edge is kept, parallel edges
/// included. Dangling callees and undeclared parents become external nodes.
pub fn build_graph(model: &CodeModel) -> DependencyGraph {
    let mut builder = GraphBuilder::new();
    let summary = |id: &str| model.declaration_summaries.get(id).cloned();

    for (class, methods) in &model.classes {
        let mut node = Node::new(class.clone(), NodeType::Class);
        if let Some(module) = model.module_of.get(class) {
            node = node.with_module(module.clone());
        }
        if let Some(text) = summary(class) {
            node = node.with_summary(text);
        }
        builder.add_node(node);

        for method in methods {
            let mut node = Node::new(method.clone(), NodeType::Method);
            if let Some(text) = summary(method) {
                node = node.with_summary(text);
            }
            builder.add_node(node);
            builder.add_edge(Edge::new(EdgeType::Contains, class.clone(), method.clone()));
        }
    }

    for function in &model.standalone_functions {
        let mut node = Node::new(function.clone(), NodeType::Function);
        if let Some(text) = summary(function) {
            node = node.with_summary(text);
        }
        builder.add_node(node);
    }

    for (class, parent) in &model.inheritance {
        if let Some(parent) = parent {
            builder.ensure_node(class);
            builder.connect(Edge::new(
                EdgeType::Inheritance,
                class.clone(),
                parent.clone(),
            ));
        }
    }

    for edge in &model.edges {
        builder.connect(Edge::new(
            EdgeType::Call,
            edge.caller.clone(),
            edge.callee.clone(),
        ));
    }

    builder.build()
}
