use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Separator between module, class and member segments of a qualified name.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Summary text used when a declaration carries no docstring.
pub const NO_DOCSTRING: &str = "No docstring";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Class,
    Method,
    StandaloneFunction,
}

/// A call from `caller` to a best-effort reconstruction of the called name.
///
/// The callee is not guaranteed to name a known declaration; dangling callees
/// are kept so consumers can decide how to show unknown targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

/// Builds `<prefix>.<name>`, or `name` alone when the prefix is empty.
pub fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{NAMESPACE_SEPARATOR}{name}")
    }
}

/// Final dotted segment of a qualified name.
pub fn short_name(qualified: &str) -> &str {
    qualified
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(qualified)
}

/// Everything extracted from a single module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleExtraction {
    pub module: String,
    pub path: PathBuf,
    pub classes: BTreeMap<String, Vec<String>>,
    pub inheritance: BTreeMap<String, Option<String>>,
    pub functions: Vec<String>,
    pub summaries: BTreeMap<String, String>,
    pub edges: Vec<CallEdge>,
    /// Declarations recorded with incomplete information.
    pub partial_declarations: usize,
}

impl ModuleExtraction {
    pub fn new(module: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// The aggregated cross-module model handed to formatters and renderers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeModel {
    /// Class qualified name to its methods, in declaration order.
    pub classes: BTreeMap<String, Vec<String>>,
    pub standalone_functions: Vec<String>,
    /// Class qualified name to its recorded parent. Every class has a key;
    /// `None` means no parent was recorded.
    pub inheritance: BTreeMap<String, Option<String>>,
    pub edges: Vec<CallEdge>,
    pub declaration_summaries: BTreeMap<String, String>,
    /// Class qualified name to the module it was declared in.
    pub module_of: BTreeMap<String, String>,
}

impl CodeModel {
    pub fn kind_of(&self, qualified: &str) -> Option<DeclarationKind> {
        if self.classes.contains_key(qualified) {
            return Some(DeclarationKind::Class);
        }
        if self.method_owner(qualified).is_some() {
            return Some(DeclarationKind::Method);
        }
        if self.standalone_functions.iter().any(|f| f == qualified) {
            return Some(DeclarationKind::StandaloneFunction);
        }
        None
    }

    /// Class owning the given method, if it is a recorded method.
    pub fn method_owner(&self, qualified: &str) -> Option<&str> {
        let (owner, _) = qualified.rsplit_once(NAMESPACE_SEPARATOR)?;
        let (owner, methods) = self.classes.get_key_value(owner)?;
        methods
            .iter()
            .any(|m| m == qualified)
            .then_some(owner.as_str())
    }

    pub fn is_declared(&self, qualified: &str) -> bool {
        self.kind_of(qualified).is_some()
    }

    /// Callee names that match no declaration, in first-seen order.
    pub fn dangling_callees(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.edges
            .iter()
            .map(|edge| edge.callee.as_str())
            .filter(|callee| !self.is_declared(callee))
            .filter(|callee| seen.insert(*callee))
            .collect()
    }

    pub fn method_count(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn declaration_count(&self) -> usize {
        self.classes.len() + self.method_count() + self.standalone_functions.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub message: String,
}

/// Run-level counters for everything that was recovered rather than fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunDiagnostics {
    pub files_discovered: usize,
    pub files_analyzed: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub partial_declarations: usize,
}

impl RunDiagnostics {
    pub fn files_skipped(&self) -> usize {
        self.skipped_files.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_files.is_empty() && self.partial_declarations == 0
    }
}

/// Result of a whole analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisReport {
    pub model: CodeModel,
    pub diagnostics: RunDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_skips_empty_prefix() {
        assert_eq!(qualify("", "Worker"), "Worker");
        assert_eq!(qualify("pkg.main", "Worker"), "pkg.main.Worker");
    }

    #[test]
    fn short_name_takes_last_segment() {
        assert_eq!(short_name("pkg.main.Worker"), "Worker");
        assert_eq!(short_name("Worker"), "Worker");
    }

    #[test]
    fn dangling_callees_are_unique_and_exclude_declarations() {
        let mut model = CodeModel::default();
        model
            .classes
            .insert("m.A".into(), vec!["m.A.run".into()]);
        model.inheritance.insert("m.A".into(), None);
        model.standalone_functions.push("m.helper".into());
        model.edges = vec![
            CallEdge::new("m.A.run", "m.helper"),
            CallEdge::new("m.A.run", "print"),
            CallEdge::new("m.helper", "print"),
            CallEdge::new("m.helper", "m.A.run"),
        ];

        assert_eq!(model.dangling_callees(), vec!["print"]);
        assert_eq!(model.kind_of("m.A.run"), Some(DeclarationKind::Method));
        assert_eq!(model.method_owner("m.A.run"), Some("m.A"));
        assert_eq!(model.declaration_count(), 3);
    }

    #[test]
    fn method_owner_outlives_the_queried_name() {
        let mut model = CodeModel::default();
        model
            .classes
            .insert("m.A".into(), vec!["m.A.run".into()]);

        let owner = {
            let query = String::from("m.A.run");
            model.method_owner(&query)
        };
        assert_eq!(owner, Some("m.A"));
        assert_eq!(model.method_owner("m.A.stop"), None);
        assert_eq!(model.method_owner("run"), None);
    }
}
