use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::error::{AnalysisError, Result};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    pub fn parse_source(&mut self, source: &str, file_path: &Path) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| AnalysisError::parse(file_path, "parser produced no syntax tree"))
    }
}

/// Reads a source file as UTF-8 text. Invalid UTF-8 surfaces as an
/// [`AnalysisError::Io`] with kind `InvalidData`.
pub fn read_source(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let file_size = file
        .metadata()
        .map(|metadata| metadata.len() as usize)
        .unwrap_or(0);

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader
        .read_to_string(&mut content)
        .map_err(|e| AnalysisError::io(path, e))?;
    Ok(content)
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

/// Text of the named field, or `None` when the field is absent or empty.
pub fn field_text<'a>(node: &TSNode, field: &str, source: &'a [u8]) -> Option<&'a str> {
    let child = node.child_by_field_name(field)?;
    let text = extract_text(&child, source);
    (!text.is_empty() && !child.is_missing()).then_some(text)
}

pub fn named_children<'a>(node: &TSNode<'a>) -> Vec<TSNode<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Finds the first error or missing node below `node` in source order.
pub fn first_syntax_error<'a>(node: TSNode<'a>) -> Option<TSNode<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<TSNode<'a>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_syntax_error)
}

/// Describes where the first syntax error sits, with 1-based line and column.
pub fn describe_syntax_error(node: &TSNode) -> String {
    let position = node.start_position();
    let what = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        "invalid syntax".to_string()
    };
    format!(
        "{what} at line {}, column {}",
        position.row + 1,
        position.column + 1
    )
}
