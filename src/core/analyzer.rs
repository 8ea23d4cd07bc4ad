use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use super::aggregator::Aggregator;
use super::filter::SelectionFilter;
use super::model::{AnalysisReport, ModuleExtraction};
use super::scanner::{FileScanner, SourceUnit};
use crate::error::Result;
use crate::parsers::python::PythonParser;
use crate::parsers::LanguageParser;

/// Knobs for a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub extensions: Vec<String>,
    pub include_hidden: bool,
    pub follow_links: bool,
    pub tolerate_syntax_errors: bool,
    /// Extract modules on the rayon pool. Output order is the same either way.
    pub parallel: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            include_hidden: false,
            follow_links: false,
            tolerate_syntax_errors: false,
            parallel: true,
        }
    }
}

impl AnalyzerOptions {
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_tolerance(mut self, tolerate_syntax_errors: bool) -> Self {
        self.tolerate_syntax_errors = tolerate_syntax_errors;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Runs loader, extractors and aggregator over a root location.
///
/// The analyzer holds no state between runs; every call builds its model
/// from scratch.
pub struct CodebaseAnalyzer {
    file_scanner: FileScanner,
    parser: Box<dyn LanguageParser>,
    parallel: bool,
}

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        Self::with_options(AnalyzerOptions::default())
    }

    pub fn with_options(options: AnalyzerOptions) -> Self {
        let file_scanner = FileScanner::new()
            .with_extensions(options.extensions)
            .with_hidden(options.include_hidden)
            .with_follow_links(options.follow_links);
        let parser = PythonParser::new().with_tolerance(options.tolerate_syntax_errors);

        Self {
            file_scanner,
            parser: Box::new(parser),
            parallel: options.parallel,
        }
    }

    /// Analyzes every source unit under `root`.
    ///
    /// Fails only when `root` does not exist; unreadable or unparseable files
    /// are logged, skipped and counted in the report diagnostics.
    pub fn analyze(&self, root: &Path) -> Result<AnalysisReport> {
        info!(root = %root.display(), "scanning source files");
        let units = self.file_scanner.scan(root)?;
        info!(
            files = units.len(),
            language = self.parser.language_name(),
            "extracting declarations"
        );

        let results = self.extract_all(&units);

        let mut aggregator = Aggregator::new();
        aggregator.record_discovered(units.len());
        for (unit, result) in units.iter().zip(results) {
            match result {
                Ok(extraction) => aggregator.add_module(extraction),
                Err(err) => {
                    warn!(path = %unit.path.display(), error = %err, "skipping file");
                    aggregator.skip_file(&unit.path, err.to_string());
                }
            }
        }

        let report = aggregator.finish();
        info!(
            classes = report.model.classes.len(),
            functions = report.model.standalone_functions.len(),
            edges = report.model.edges.len(),
            skipped = report.diagnostics.files_skipped(),
            partial = report.diagnostics.partial_declarations,
            "analysis complete"
        );
        Ok(report)
    }

    /// Analyzes `root` and narrows the model to the selected class names.
    pub fn analyze_selected<S: AsRef<str>>(
        &self,
        root: &Path,
        selection: &[S],
    ) -> Result<AnalysisReport> {
        let mut report = self.analyze(root)?;
        let filter = SelectionFilter::new(selection);
        if !filter.is_identity() {
            info!(classes = ?filter.names(), "applying class selection");
            report.model = filter.apply(&report.model);
        }
        Ok(report)
    }

    /// Results come back in `units` order regardless of scheduling.
    fn extract_all(&self, units: &[SourceUnit]) -> Vec<Result<ModuleExtraction>> {
        if self.parallel {
            units
                .par_iter()
                .map(|unit| self.parser.parse_unit(unit))
                .collect()
        } else {
            units
                .iter()
                .map(|unit| self.parser.parse_unit(unit))
                .collect()
        }
    }
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
