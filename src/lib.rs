//! # pycallmap
//!
//! Structural call-graph extraction for Python codebases.
//!
//! pycallmap parses every module under a root with tree-sitter and builds a
//! single model of the codebase: classes with their methods and first plain
//! base class, standalone functions, a signature and docstring summary per
//! declaration, and every call expression as a `(caller, callee)` edge.
//! Callee names are reconstructed lexically (`self.repo.save`, `helper`), so
//! calls into unknown code are kept as dangling names rather than dropped.
//!
//! ## Pipeline
//!
//! - **Scanner** ([`core::scanner`]): source units and dotted module ids
//! - **Extractors** ([`parsers::python`], [`parsers::calls`]): declarations
//!   and call edges per module
//! - **Aggregator** ([`core::aggregator`]): merges modules into a [`core::CodeModel`]
//! - **Selection filter** ([`core::filter`]): optional narrowing to class names
//!
//! ## Output Formats
//!
//! - **JSON**: the model and run diagnostics
//! - **JSON-Compact**: node/edge table for diagram renderers
//! - **Markdown**: readable listing

pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;

pub use error::{AnalysisError, Result};
