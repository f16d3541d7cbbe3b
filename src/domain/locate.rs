// Declaration locator: find a top-level function by name.

use crate::domain::error::{Result, TraceError};
use crate::domain::tree::{unparse_item_fn, SyntaxTree};
use crate::domain::visit::{walk_file, Flow, NodeMut, Visitor};
use syn::{Item, ItemFn};

/// A borrowed handle to one function declaration inside a [`SyntaxTree`].
///
/// The handle remembers how many parameters the function had when it was
/// located, so later passes can tell original parameters apart from the
/// ones instrumentation appended.
#[derive(Debug)]
pub struct FunctionHandle<'t> {
    decl: &'t mut ItemFn,
    name: String,
    original_arity: usize,
}

impl<'t> FunctionHandle<'t> {
    pub fn new(decl: &'t mut ItemFn) -> Self {
        let name = decl.sig.ident.to_string();
        let original_arity = decl.sig.inputs.len();
        Self {
            decl,
            name,
            original_arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original_arity(&self) -> usize {
        self.original_arity
    }

    /// Current parameter count, including anything appended since locating.
    pub fn arity(&self) -> usize {
        self.decl.sig.inputs.len()
    }

    pub fn decl(&self) -> &ItemFn {
        &*self.decl
    }

    pub(crate) fn decl_mut(&mut self) -> &mut ItemFn {
        &mut *self.decl
    }

    /// Serialize the declaration in its current state.
    pub fn to_source(&self) -> String {
        unparse_item_fn(&*self.decl)
    }
}

/// Scans top-level items only and records the index of the first `fn`
/// whose name matches.
struct DeclarationLocator<'n> {
    name: &'n str,
    position: usize,
    found: Option<usize>,
}

impl Visitor for DeclarationLocator<'_> {
    fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow> {
        if let NodeMut::Item(item) = node {
            if self.found.is_none() {
                if let Item::Fn(func) = item {
                    if func.sig.ident == self.name {
                        self.found = Some(self.position);
                    }
                }
            }
            self.position += 1;
        }
        // Nested items (impl methods, inner fns, modules) are never candidates.
        Ok(Flow::Skip)
    }
}

/// Locate the top-level function `name`. First match wins.
pub fn locate<'t>(tree: &'t mut SyntaxTree, name: &str) -> Result<FunctionHandle<'t>> {
    let mut locator = DeclarationLocator {
        name,
        position: 0,
        found: None,
    };
    walk_file(&mut locator, &mut tree.file)?;

    let not_found = || TraceError::NotFound {
        name: name.to_string(),
    };
    let index = locator.found.ok_or_else(not_found)?;
    match tree.file.items.get_mut(index) {
        Some(Item::Fn(decl)) => {
            tracing::debug!(function = name, index, "[Locate] found declaration");
            Ok(FunctionHandle::new(decl))
        }
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
struct Tree;

impl Tree {
    fn walk(&self) {}
}

mod inner {
    pub fn hidden() {}
}

fn fact(n: u64) -> u64 {
    if n == 0 { 1 } else { n * fact(n - 1) }
}

fn fact(n: u64, acc: u64) -> u64 {
    acc
}
"#;

    #[test]
    fn finds_top_level_function() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        let handle = locate(&mut tree, "fact").unwrap();
        assert_eq!(handle.name(), "fact");
        assert_eq!(handle.original_arity(), 1);
        assert_eq!(handle.arity(), 1);
    }

    #[test]
    fn first_match_wins() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        let handle = locate(&mut tree, "fact").unwrap();
        // The second `fact` takes two parameters.
        assert_eq!(handle.decl().sig.inputs.len(), 1);
    }

    #[test]
    fn missing_name_is_not_found() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        match locate(&mut tree, "doesNotExist") {
            Err(TraceError::NotFound { name }) => assert_eq!(name, "doesNotExist"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn methods_and_nested_functions_are_ignored() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        assert!(locate(&mut tree, "walk").is_err());
        assert!(locate(&mut tree, "hidden").is_err());
    }

    #[test]
    fn handle_serializes_declaration() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        let handle = locate(&mut tree, "fact").unwrap();
        let text = handle.to_source();
        assert!(text.starts_with("fn fact(n: u64) -> u64"), "{}", text);
    }
}
