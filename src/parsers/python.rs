use std::collections::BTreeMap;
use tracing::debug;
use tree_sitter::Node as TSNode;

use super::calls::CallSiteExtractor;
use super::common::{
    describe_syntax_error, extract_text, field_text, first_syntax_error, named_children,
    read_source, TreeSitterParser,
};
use super::docstring::extract_docstring;
use super::LanguageParser;
use crate::core::model::{qualify, ModuleExtraction, NO_DOCSTRING};
use crate::core::scanner::SourceUnit;
use crate::error::{AnalysisError, Result};

pub struct PythonParser {
    tolerate_syntax_errors: bool,
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            tolerate_syntax_errors: false,
        }
    }

    /// Extract from files containing syntax errors instead of skipping them.
    /// Declarations touched by an error are counted as partial.
    pub fn with_tolerance(mut self, tolerate_syntax_errors: bool) -> Self {
        self.tolerate_syntax_errors = tolerate_syntax_errors;
        self
    }

    /// Extracts declarations and call edges from already loaded source text.
    pub fn parse_source(&self, unit: &SourceUnit, source: &str) -> Result<ModuleExtraction> {
        let mut parser = TreeSitterParser::new(tree_sitter_python::language())?;
        let tree = parser.parse_source(source, &unit.path)?;
        let root = tree.root_node();

        if !self.tolerate_syntax_errors {
            if let Some(error) = first_syntax_error(root) {
                return Err(AnalysisError::parse(
                    &unit.path,
                    describe_syntax_error(&error),
                ));
            }
        }

        let mut extractor = DeclarationExtractor::new(unit, source.as_bytes());
        extractor.visit_scope(&root);
        Ok(extractor.finish())
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for PythonParser {
    fn parse_unit(&self, unit: &SourceUnit) -> Result<ModuleExtraction> {
        let source = read_source(&unit.path)?;
        self.parse_source(unit, &source)
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

/// Walks one module and records classes, methods, standalone functions,
/// summaries and call edges.
struct DeclarationExtractor<'s> {
    source: &'s [u8],
    calls: CallSiteExtractor<'s>,
    result: ModuleExtraction,
    /// Raw first plain-name base per class, resolved once the module is done.
    bases: BTreeMap<String, Option<String>>,
}

impl<'s> DeclarationExtractor<'s> {
    fn new(unit: &SourceUnit, source: &'s [u8]) -> Self {
        Self {
            source,
            calls: CallSiteExtractor::new(source),
            result: ModuleExtraction::new(unit.module.clone(), unit.path.clone()),
            bases: BTreeMap::new(),
        }
    }

    /// Module scope: definitions anywhere outside a function body, including
    /// those guarded by `if`/`try`/`with` blocks.
    fn visit_scope(&mut self, node: &TSNode) {
        for child in named_children(node) {
            match child.kind() {
                "class_definition" => self.process_class(&child),
                "function_definition" => self.process_function(&child, None, None),
                "decorated_definition" => self.process_decorated(&child, None),
                _ => {
                    self.note_unreadable(&child);
                    self.visit_scope(&child)
                }
            }
        }
    }

    /// Class scope: every function reached without crossing another
    /// definition is a method of `class_name`.
    fn visit_class_body(&mut self, node: &TSNode, class_name: &str) {
        for child in named_children(node) {
            match child.kind() {
                "class_definition" => self.process_class(&child),
                "function_definition" => self.process_function(&child, None, Some(class_name)),
                "decorated_definition" => self.process_decorated(&child, Some(class_name)),
                _ => {
                    self.note_unreadable(&child);
                    self.visit_class_body(&child, class_name)
                }
            }
        }
    }

    /// An error node outside any function usually holds a definition the
    /// parser could not recover; whatever it still contains is extracted.
    fn note_unreadable(&mut self, node: &TSNode) {
        if node.is_error() {
            debug!(
                module = %self.result.module,
                line = node.start_position().row + 1,
                "unreadable region"
            );
            self.result.partial_declarations += 1;
        }
    }

    fn process_decorated(&mut self, decorated: &TSNode, class_name: Option<&str>) {
        let Some(definition) = decorated.child_by_field_name("definition") else {
            self.result.partial_declarations += 1;
            return;
        };
        match definition.kind() {
            "class_definition" => self.process_class(&definition),
            "function_definition" => {
                self.process_function(&definition, Some(decorated), class_name)
            }
            _ => {}
        }
    }

    fn process_class(&mut self, class_node: &TSNode) {
        let Some(class_name) = field_text(class_node, "name", self.source) else {
            debug!(
                module = %self.result.module,
                line = class_node.start_position().row + 1,
                "class without a readable name"
            );
            self.result.partial_declarations += 1;
            return;
        };
        let qualified = qualify(&self.result.module, class_name);

        let superclasses = class_node.child_by_field_name("superclasses");
        let base_texts: Vec<&str> = superclasses
            .map(|args| {
                named_children(&args)
                    .iter()
                    .filter(|arg| arg.kind() != "comment")
                    .map(|arg| extract_text(arg, self.source))
                    .collect()
            })
            .unwrap_or_default();
        let parent = superclasses.and_then(|args| {
            named_children(&args)
                .into_iter()
                .find(|arg| arg.kind() == "identifier")
                .map(|arg| extract_text(&arg, self.source).to_string())
        });

        let body = class_node.child_by_field_name("body");
        let malformed = body.is_none()
            || class_node.child_by_field_name("name").is_some_and(|n| n.has_error())
            || superclasses.is_some_and(|args| args.has_error());
        if malformed {
            self.result.partial_declarations += 1;
        }

        // A later definition under the same name rebinds it.
        self.result.classes.insert(qualified.clone(), Vec::new());
        self.bases.insert(qualified.clone(), parent);
        self.result.summaries.insert(
            qualified.clone(),
            self.summary(class_node, class_name, &base_texts.join(", ")),
        );

        if let Some(body) = body {
            self.visit_class_body(&body, &qualified);
        }
    }

    fn process_function(
        &mut self,
        func_node: &TSNode,
        decorated: Option<&TSNode>,
        class_name: Option<&str>,
    ) {
        let Some(func_name) = field_text(func_node, "name", self.source) else {
            debug!(
                module = %self.result.module,
                line = func_node.start_position().row + 1,
                "function without a readable name"
            );
            self.result.partial_declarations += 1;
            return;
        };

        let qualified = match class_name {
            Some(class_name) => {
                let qualified = qualify(class_name, func_name);
                if let Some(methods) = self.result.classes.get_mut(class_name) {
                    if !methods.contains(&qualified) {
                        methods.push(qualified.clone());
                    }
                }
                qualified
            }
            None => {
                let qualified = qualify(&self.result.module, func_name);
                if !self.result.functions.contains(&qualified) {
                    self.result.functions.push(qualified.clone());
                }
                qualified
            }
        };

        if func_node.has_error() || func_node.child_by_field_name("body").is_none() {
            self.result.partial_declarations += 1;
        }

        let parameters = func_node
            .child_by_field_name("parameters")
            .map(|params| self.parameter_names(&params))
            .unwrap_or_default();
        self.result.summaries.insert(
            qualified.clone(),
            self.summary(func_node, func_name, &parameters.join(", ")),
        );

        if let Some(decorated) = decorated {
            self.collect_decorator_calls(decorated, &qualified);
        }
        self.calls
            .extract(func_node, &qualified, &mut self.result.edges);
    }

    fn collect_decorator_calls(&mut self, decorated: &TSNode, caller: &str) {
        for decorator in named_children(decorated)
            .into_iter()
            .filter(|child| child.kind() == "decorator")
        {
            self.calls.extract(&decorator, caller, &mut self.result.edges);
        }
    }

    /// Declared parameter names in order, without annotations, defaults or
    /// `*`/`**` markers. Bare `*` and `/` separators are not parameters.
    fn parameter_names(&self, params: &TSNode) -> Vec<&'s str> {
        named_children(params)
            .iter()
            .filter_map(|param| self.parameter_name(param))
            .collect()
    }

    fn parameter_name(&self, param: &TSNode) -> Option<&'s str> {
        let name = match param.kind() {
            "identifier" => Some(extract_text(param, self.source)),
            "default_parameter" | "typed_default_parameter" => {
                field_text(param, "name", self.source)
            }
            "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                named_children(param)
                    .first()
                    .and_then(|inner| self.parameter_name(inner))
            }
            _ => None,
        };
        name.filter(|name| !name.is_empty())
    }

    fn summary(&self, definition: &TSNode, name: &str, signature: &str) -> String {
        let doc = extract_docstring(definition, self.source);
        format!(
            "{name}({signature})\n{}",
            doc.as_deref().unwrap_or(NO_DOCSTRING)
        )
    }

    /// Qualifies each recorded base with this module when the module declares
    /// a class of that name; other bases keep their bare name.
    fn finish(mut self) -> ModuleExtraction {
        let module = self.result.module.clone();
        for (class, base) in std::mem::take(&mut self.bases) {
            let parent = base.map(|base| {
                let local = qualify(&module, &base);
                if self.result.classes.contains_key(&local) {
                    local
                } else {
                    base
                }
            });
            self.result.inheritance.insert(class, parent);
        }
        self.result
    }
}
