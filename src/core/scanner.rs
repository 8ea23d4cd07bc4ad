use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::model::NAMESPACE_SEPARATOR;
use crate::error::{AnalysisError, Result};

/// Directory names never descended into unless hidden entries are requested.
const IGNORED_DIRECTORIES: &[&str] = &[
    "__pycache__",
    "node_modules",
    "venv",
    "site-packages",
];

/// One file selected for analysis together with its module identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Dotted module path, empty when the root is a single file.
    pub module: String,
}

#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: Vec<String>,
    include_hidden: bool,
    follow_links: bool,
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            include_hidden: false,
            follow_links: false,
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(Into::into)
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
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

    /// Enumerates the source units under `root`, sorted by path.
    ///
    /// A file root yields exactly one unit with an empty module identifier,
    /// whatever its extension.
    pub fn scan(&self, root: &Path) -> Result<Vec<SourceUnit>> {
        if !root.exists() {
            return Err(AnalysisError::root_not_found(root));
        }

        if root.is_file() {
            return Ok(vec![SourceUnit {
                path: root.to_path_buf(),
                module: String::new(),
            }]);
        }

        let mut units = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.should_descend(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if !self.has_source_extension(entry.path()) {
                continue;
            }

            let Some(module) = module_identifier(root, entry.path()) else {
                debug!(path = %entry.path().display(), "path is outside the scan root");
                continue;
            };

            units.push(SourceUnit {
                path: entry.into_path(),
                module,
            });
        }

        Ok(units)
    }

    fn should_descend(&self, entry: &DirEntry) -> bool {
        if self.include_hidden {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return false;
        }
        !(entry.file_type().is_dir() && IGNORED_DIRECTORIES.contains(&name.as_ref()))
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known == ext))
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the dotted module path of `path` relative to `root`:
/// `pkg/sub/mod.py` under `root` becomes `pkg.sub.mod`.
pub fn module_identifier(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return None;
    }
    Some(segments.join(&NAMESPACE_SEPARATOR.to_string()))
}
