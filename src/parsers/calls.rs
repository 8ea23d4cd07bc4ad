use tree_sitter::Node as TSNode;

use super::common::extract_text;
use crate::core::model::{CallEdge, NAMESPACE_SEPARATOR};

/// Collects call edges from one declaration subtree.
///
/// Every `call` node below the root is attributed to the same caller,
/// including calls inside nested functions, lambdas, classes and
/// comprehensions. Calls are reported in source order, outer call first.
pub struct CallSiteExtractor<'s> {
    source: &'s [u8],
}

impl<'s> CallSiteExtractor<'s> {
    pub fn new(source: &'s [u8]) -> Self {
        Self { source }
    }

    pub fn extract(&self, root: &TSNode, caller: &str, edges: &mut Vec<CallEdge>) {
        let mut stack = vec![*root];
        while let Some(node) = stack.pop() {
            if node.kind() == "call" {
                if let Some(callee) = self.callee(&node) {
                    edges.push(CallEdge::new(caller, callee));
                }
            }

            let mut cursor = node.walk();
            let children: Vec<TSNode> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    /// Reconstructs the callee name of a `call` node. Returns `None` when the
    /// call target is neither a name nor an attribute access.
    pub fn callee(&self, call: &TSNode) -> Option<String> {
        let function = unparenthesize(call.child_by_field_name("function")?);
        match function.kind() {
            "identifier" => self.text(&function).map(str::to_string),
            "attribute" => {
                let attribute = function.child_by_field_name("attribute")?;
                let attribute = self.text(&attribute)?;
                let receiver = function.child_by_field_name("object")?;

                // `<expr>.method()` keeps only the attribute name.
                Some(match self.attribute_chain(&receiver) {
                    Some(chain) => format!("{chain}{NAMESPACE_SEPARATOR}{attribute}"),
                    None => attribute.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Dotted path of a receiver made only of names and attribute accesses.
    fn attribute_chain(&self, node: &TSNode) -> Option<String> {
        let node = unparenthesize(*node);
        match node.kind() {
            "identifier" => self.text(&node).map(str::to_string),
            "attribute" => {
                let object = node.child_by_field_name("object")?;
                let attribute = node.child_by_field_name("attribute")?;
                let base = self.attribute_chain(&object)?;
                Some(format!(
                    "{base}{NAMESPACE_SEPARATOR}{}",
                    self.text(&attribute)?
                ))
            }
            _ => None,
        }
    }

    fn text(&self, node: &TSNode) -> Option<&'s str> {
        let text = extract_text(node, self.source);
        (!text.is_empty() && !node.is_missing()).then_some(text)
    }
}

/// Strips redundant parentheses: `((self.a))` reads as `self.a`.
fn unparenthesize(mut node: TSNode<'_>) -> TSNode<'_> {
    while node.kind() == "parenthesized_expression" && node.named_child_count() == 1 {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}
