use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::AnalysisReport;

/// Serializes the full report: the model plus run diagnostics.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format(&self, report: &AnalysisReport) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.context("failed to serialize analysis report")
    }

    pub fn format_to_file(&self, report: &AnalysisReport, output_path: &Path) -> Result<()> {
        let content = self.format(report)?;
        fs::write(output_path, content)
            .with_context(|| format!("failed to write {}", output_path.display()))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
