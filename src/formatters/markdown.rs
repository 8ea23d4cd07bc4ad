use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::AnalysisReport;

/// Human-readable listing of the model, grouped by class.
pub struct MarkdownFormatter {
    include_summaries: bool,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            include_summaries: true,
        }
    }

    pub fn with_summaries(mut self, include_summaries: bool) -> Self {
        self.include_summaries = include_summaries;
        self
    }

    pub fn format(&self, report: &AnalysisReport) -> Result<String> {
        let model = &report.model;
        let diagnostics = &report.diagnostics;
        let mut out = String::new();

        writeln!(out, "# CALL_MAP")?;
        writeln!(
            out,
            "CLASSES:{} METHODS:{} FUNCTIONS:{} EDGES:{}",
            model.classes.len(),
            model.method_count(),
            model.standalone_functions.len(),
            model.edges.len()
        )?;
        writeln!(out)?;

        writeln!(out, "## CLASSES")?;
        for (class, methods) in &model.classes {
            let parent = model
                .inheritance
                .get(class)
                .and_then(|parent| parent.as_deref());
            match parent {
                Some(parent) => writeln!(out, "### {class} : {parent}")?,
                None => writeln!(out, "### {class}")?,
            }
            if let Some(module) = model.module_of.get(class).filter(|m| !m.is_empty()) {
                writeln!(out, "module: {module}")?;
            }
            self.write_summary(&mut out, report, class)?;
            for method in methods {
                writeln!(out, "- {method}")?;
                self.write_summary(&mut out, report, method)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "## FUNCTIONS")?;
        for function in &model.standalone_functions {
            writeln!(out, "- {function}")?;
            self.write_summary(&mut out, report, function)?;
        }
        writeln!(out)?;

        writeln!(out, "## CALLS")?;
        for edge in &model.edges {
            let marker = if model.is_declared(&edge.callee) {
                ""
            } else {
                " (external)"
            };
            writeln!(out, "{} -> {}{marker}", edge.caller, edge.callee)?;
        }
        writeln!(out)?;

        writeln!(out, "## DIAGNOSTICS")?;
        writeln!(
            out,
            "FILES:{} ANALYZED:{} SKIPPED:{} PARTIAL:{}",
            diagnostics.files_discovered,
            diagnostics.files_analyzed,
            diagnostics.files_skipped(),
            diagnostics.partial_declarations
        )?;
        for skipped in &diagnostics.skipped_files {
            writeln!(out, "- {}: {}", skipped.path.display(), skipped.message)?;
        }

        Ok(out)
    }

    pub fn format_to_file(&self, report: &AnalysisReport, output_path: &Path) -> Result<()> {
        let content = self.format(report)?;
        fs::write(output_path, content)
            .with_context(|| format!("failed to write {}", output_path.display()))
    }

    fn write_summary(&self, out: &mut String, report: &AnalysisReport, name: &str) -> Result<()> {
        if !self.include_summaries {
            return Ok(());
        }
        if let Some(summary) = report.model.declaration_summaries.get(name) {
            for line in summary.lines() {
                writeln!(out, "    {line}")?;
            }
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}
