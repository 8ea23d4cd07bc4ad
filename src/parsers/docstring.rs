//! Docstring lookup and cleanup for Python definitions.
//!
//! A docstring is the first statement of a definition body when that
//! statement is a plain (non-bytes, non-f) string literal. The returned text
//! is normalized the way Python's `inspect.cleandoc` does, removing the
//! common indentation of continuation lines and surrounding blank lines.

use tree_sitter::Node as TSNode;

use super::common::{extract_text, named_children};

const TAB_SIZE: usize = 8;

/// Returns the cleaned docstring of a `class_definition` or
/// `function_definition`, if any. Empty docstrings count as absent.
pub fn extract_docstring(definition: &TSNode, source: &[u8]) -> Option<String> {
    let body = definition.child_by_field_name("body")?;
    let first = named_children(&body)
        .into_iter()
        .find(|child| child.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let literal = first.named_child(0)?;
    let raw = match literal.kind() {
        "string" => string_value(extract_text(&literal, source))?,
        "concatenated_string" => {
            let mut joined = String::new();
            for part in named_children(&literal) {
                if part.kind() == "string" {
                    joined.push_str(&string_value(extract_text(&part, source))?);
                }
            }
            joined
        }
        _ => return None,
    };

    let cleaned = clean_docstring(&raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Decodes a single string literal token, rejecting bytes and f-strings.
fn string_value(literal: &str) -> Option<String> {
    let quote_at = literal.find(['"', '\''])?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if prefix.contains('b') || prefix.contains('f') {
        return None;
    }
    let raw = prefix.contains('r');

    let quoted = &literal[quote_at..];
    let delimiter = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    let body = quoted
        .strip_prefix(delimiter)?
        .strip_suffix(delimiter)
        .unwrap_or_else(|| &quoted[delimiter.len()..]);

    Some(if raw {
        body.to_string()
    } else {
        unescape(body)
    })
}

/// Decodes Python string escapes. Unknown escapes are kept verbatim, as
/// Python does, and so are `\N{...}` named escapes since no Unicode name
/// table is bundled. Numeric escapes outside the scalar range stay raw.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };
        let simple = match next {
            '\n' => Some(None),
            '\r' => {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                continue;
            }
            'n' => Some(Some('\n')),
            't' => Some(Some('\t')),
            'r' => Some(Some('\r')),
            'a' => Some(Some('\x07')),
            'b' => Some(Some('\x08')),
            'f' => Some(Some('\x0c')),
            'v' => Some(Some('\x0b')),
            '\\' | '\'' | '"' => Some(Some(next)),
            _ => None,
        };
        if let Some(decoded) = simple {
            chars.next();
            out.extend(decoded);
            continue;
        }

        match next {
            '0'..='7' => {
                let mut value = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                // Octal escapes top out at \777, always a valid scalar.
                out.extend(char::from_u32(value));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().skip(1).take(width).collect();
                let decoded = (digits.len() == width
                    && digits.chars().all(|d| d.is_ascii_hexdigit()))
                .then(|| u32::from_str_radix(&digits, 16).ok())
                .flatten()
                .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        chars.nth(width);
                        out.push(decoded);
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column = if c == '\n' { 0 } else { column + 1 };
        }
    }
    out
}

pub fn clean_docstring(doc: &str) -> String {
    let expanded = expand_tabs(doc);
    let mut lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min();

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    if let Some(first) = lines.first_mut() {
        *first = first.trim_start();
    }
    for (index, line) in lines.iter().enumerate() {
        if index == 0 {
            cleaned.push(line.to_string());
            continue;
        }
        let strip = margin.unwrap_or(0).min(line.len() - line.trim_start_matches(' ').len());
        cleaned.push(line[strip..].to_string());
    }

    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|line| line.is_empty()).count();
    cleaned.drain(..leading);

    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_docstring_removes_common_indent() {
        let doc = "Summary line.\n\n        Details here.\n          Indented more.\n        ";
        assert_eq!(
            clean_docstring(doc),
            "Summary line.\n\nDetails here.\n  Indented more."
        );
    }

    #[test]
    fn clean_docstring_drops_leading_blank_lines() {
        assert_eq!(clean_docstring("\n    Text.\n    "), "Text.");
    }

    #[test]
    fn string_value_rejects_bytes_and_fstrings() {
        assert_eq!(string_value("b\"doc\""), None);
        assert_eq!(string_value("f'''doc'''"), None);
        assert_eq!(string_value("r'''a\\nb'''").as_deref(), Some("a\\nb"));
        assert_eq!(string_value("\"a\\tb\"").as_deref(), Some("a\tb"));
    }

    #[test]
    fn unescape_decodes_numeric_escapes() {
        assert_eq!(unescape(r"\x41\u00e9\U0001F600"), "A\u{e9}\u{1F600}");
        assert_eq!(unescape(r"\101\0"), "A\0");
        assert_eq!(unescape(r"bell\a tab\t"), "bell\x07 tab\t");
    }

    #[test]
    fn unescape_keeps_unknown_and_named_escapes() {
        assert_eq!(unescape(r"\d+ \N{BULLET}"), r"\d+ \N{BULLET}");
        assert_eq!(unescape(r"\xZZ \u12"), r"\xZZ \u12");
        assert_eq!(unescape("line one \\\nline two"), "line one line two");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
