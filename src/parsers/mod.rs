pub mod calls;
pub mod common;
pub mod docstring;
pub mod python;

use crate::core::model::ModuleExtraction;
use crate::core::scanner::SourceUnit;
use crate::error::Result;

/// Per-module extraction: one source unit in, its declarations and call
/// edges out. Implementations must not share state between units so the
/// analyzer can run them in parallel.
pub trait LanguageParser: Send + Sync {
    fn parse_unit(&self, unit: &SourceUnit) -> Result<ModuleExtraction>;
    fn language_name(&self) -> &str;
}
