use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use super::model::{AnalysisReport, ModuleExtraction, SkippedFile};

/// Merges per-module extraction results into one [`AnalysisReport`].
///
/// Modules must be added in a deterministic order; edges are concatenated in
/// that order with their multiplicity intact.
#[derive(Debug, Default)]
pub struct Aggregator {
    report: AnalysisReport,
    known_functions: HashSet<String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_discovered(&mut self, files: usize) {
        self.report.diagnostics.files_discovered += files;
    }

    pub fn add_module(&mut self, extraction: ModuleExtraction) {
        let ModuleExtraction {
            module,
            path,
            classes,
            inheritance,
            functions,
            summaries,
            edges,
            partial_declarations,
        } = extraction;
        let model = &mut self.report.model;

        debug!(
            module = %module,
            classes = classes.len(),
            functions = functions.len(),
            edges = edges.len(),
            "merging module"
        );

        for (class, methods) in classes {
            if model.classes.contains_key(&class) {
                warn!(class = %class, path = %path.display(), "class declared more than once, keeping the last");
            }
            model.module_of.insert(class.clone(), module.clone());
            model.classes.insert(class, methods);
        }
        model.inheritance.extend(inheritance);

        for function in functions {
            if self.known_functions.insert(function.clone()) {
                model.standalone_functions.push(function);
            }
        }

        model.declaration_summaries.extend(summaries);
        model.edges.extend(edges);

        let diagnostics = &mut self.report.diagnostics;
        diagnostics.files_analyzed += 1;
        diagnostics.partial_declarations += partial_declarations;
    }

    pub fn skip_file(&mut self, path: &Path, message: impl Into<String>) {
        self.report.diagnostics.skipped_files.push(SkippedFile {
            path: path.to_path_buf(),
            message: message.into(),
        });
    }

    pub fn finish(self) -> AnalysisReport {
        self.report
    }
}
