pub mod aggregator;
pub mod analyzer;
pub mod filter;
pub mod graph;
pub mod model;
pub mod scanner;

pub use aggregator::Aggregator;
pub use analyzer::{AnalyzerOptions, CodebaseAnalyzer};
pub use filter::{filter_model, SelectionFilter};
pub use graph::{build_graph, DependencyGraph, Edge, EdgeType, Node, NodeType};
pub use model::{
    AnalysisReport, CallEdge, CodeModel, DeclarationKind, ModuleExtraction, RunDiagnostics,
    SkippedFile,
};
pub use scanner::{FileScanner, SourceUnit};
