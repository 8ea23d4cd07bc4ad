use anyhow::Result;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::{build_graph, CodeModel, DependencyGraph, EdgeType, NodeType};

/// Node/edge table for diagram renderers, with short keys to keep the
/// payload small. Modules are interned into a `modules` array.
pub struct JsonCompactFormatter {
    /// Drop summaries from nodes
    minimal: bool,
}

impl JsonCompactFormatter {
    pub fn new() -> Self {
        Self { minimal: false }
    }

    pub fn with_minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }

    pub fn format_to_file(&self, model: &CodeModel, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(model)?)?;
        Ok(())
    }

    pub fn format(&self, model: &CodeModel) -> Result<String> {
        self.format_graph(&build_graph(model))
    }

    pub fn format_graph(&self, graph: &DependencyGraph) -> Result<String> {
        let node_indices: Vec<NodeIndex> = graph.node_indices().collect();

        let mut nodes = Vec::with_capacity(node_indices.len());
        let mut node_id_map = HashMap::new();
        let mut module_map: HashMap<&str, usize> = HashMap::new();
        let mut modules: Vec<&str> = Vec::new();

        for (position, &idx) in node_indices.iter().enumerate() {
            let Some(node) = graph.node_weight(idx) else {
                continue;
            };
            node_id_map.insert(idx, position);

            let mut node_json = json!({
                "id": node.id,
                "n": node.name,
                "t": self.type_code(node.node_type),
            });

            if let Some(module) = node.module.as_deref() {
                let module_id = *module_map.entry(module).or_insert_with(|| {
                    modules.push(module);
                    modules.len() - 1
                });
                node_json["m"] = json!(module_id);
            }
            if !self.minimal {
                if let Some(ref summary) = node.summary {
                    node_json["s"] = json!(summary);
                }
            }

            nodes.push(node_json);
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        for edge_ref in graph.edge_references() {
            if let (Some(&src_id), Some(&tgt_id)) = (
                node_id_map.get(&edge_ref.source()),
                node_id_map.get(&edge_ref.target()),
            ) {
                edges.push(json!([
                    src_id,
                    tgt_id,
                    self.edge_code(edge_ref.weight().edge_type)
                ]));
            }
        }

        let output = json!({
            "meta": {
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "format": if self.minimal { "minimal" } else { "compact" }
            },
            "modules": modules,
            "nodes": nodes,
            "edges": edges
        });

        Ok(serde_json::to_string(&output)?)
    }

    fn type_code(&self, node_type: NodeType) -> u8 {
        match node_type {
            NodeType::Class => 0,
            NodeType::Method => 1,
            NodeType::Function => 2,
            NodeType::External => 3,
        }
    }

    fn edge_code(&self, edge_type: EdgeType) -> u8 {
        match edge_type {
            EdgeType::Contains => 0,
            EdgeType::Inheritance => 1,
            EdgeType::Call => 2,
        }
    }
}

impl Default for JsonCompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}
