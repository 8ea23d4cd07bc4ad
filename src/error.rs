//! Error types for the analysis pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and parsing source units.
///
/// Only [`AnalysisError::RootNotFound`] aborts a run; the other variants are
/// raised per file and recovered by the analyzer, which records the file as
/// skipped in the run diagnostics.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analysis root does not exist.
    #[error("root location not found: {}", path.display())]
    RootNotFound {
        /// The path supplied by the caller.
        path: PathBuf,
    },

    /// A source file could not be read as UTF-8 text.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A source file does not form a valid syntax tree.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Location and nature of the first syntax error.
        message: String,
    },

    /// The bundled grammar is incompatible with the linked tree-sitter runtime.
    #[error("failed to load Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl AnalysisError {
    #[must_use]
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound { path: path.into() }
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run rather than a single file.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RootNotFound { .. } | Self::Language(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
