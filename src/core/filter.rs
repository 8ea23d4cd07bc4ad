use std::collections::HashSet;

use super::model::{short_name, CodeModel};

/// Narrows a [`CodeModel`] to a set of class short names.
///
/// Classes match on their last name segment exactly. Standalone functions
/// and call edges match by substring: a function is kept when its qualified
/// name contains a selected name, an edge when either endpoint does, so
/// `"Foo"` also keeps `"FooBar.run"`.
#[derive(Debug, Clone, Default)]
pub struct SelectionFilter {
    names: Vec<String>,
}

impl SelectionFilter {
    /// Blank names are ignored; an empty selection keeps everything.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_identity(&self) -> bool {
        self.names.is_empty()
    }

    pub fn selects_class(&self, qualified: &str) -> bool {
        let short = short_name(qualified);
        self.names.iter().any(|name| name == short)
    }

    pub fn mentions(&self, text: &str) -> bool {
        self.names.iter().any(|name| text.contains(name.as_str()))
    }

    pub fn apply(&self, model: &CodeModel) -> CodeModel {
        if self.is_identity() {
            return model.clone();
        }

        let mut filtered = CodeModel::default();

        for (class, methods) in &model.classes {
            if !self.selects_class(class) {
                continue;
            }
            filtered.classes.insert(class.clone(), methods.clone());
            filtered.inheritance.insert(
                class.clone(),
                model.inheritance.get(class).cloned().flatten(),
            );
            if let Some(module) = model.module_of.get(class) {
                filtered.module_of.insert(class.clone(), module.clone());
            }
        }

        filtered.standalone_functions = model
            .standalone_functions
            .iter()
            .filter(|function| self.mentions(function))
            .cloned()
            .collect();

        filtered.edges = model
            .edges
            .iter()
            .filter(|edge| self.mentions(&edge.caller) || self.mentions(&edge.callee))
            .cloned()
            .collect();

        let retained = filtered
            .classes
            .iter()
            .flat_map(|(class, methods)| std::iter::once(class).chain(methods))
            .chain(&filtered.standalone_functions);
        for name in retained {
            if let Some(summary) = model.declaration_summaries.get(name) {
                filtered
                    .declaration_summaries
                    .insert(name.clone(), summary.clone());
            }
        }

        filtered
    }
}

/// Applies an optional selection; `None` and empty selections are identity.
pub fn filter_model<S: AsRef<str>>(model: &CodeModel, selection: Option<&[S]>) -> CodeModel {
    match selection {
        Some(names) => SelectionFilter::new(names).apply(model),
        None => model.clone(),
    }
}
