// Parse layer: source text in, mutable syntax tree out, and back again.

use crate::domain::error::{Result, TraceError};
use syn::{File, Item, ItemFn};

/// A parsed source unit. The tree is edited in place by the instrumentation
/// passes and serialized once at the end; it is never copied.
#[derive(Debug)]
pub struct SyntaxTree {
    pub(crate) file: File,
    source: String,
}

impl SyntaxTree {
    /// Parse a complete Rust source unit.
    pub fn parse(source: &str) -> Result<Self> {
        let file = syn::parse_file(source).map_err(|e| TraceError::from_syn(&e))?;
        tracing::debug!(items = file.items.len(), "[Parse] parsed source unit");
        Ok(Self {
            file,
            source: source.to_string(),
        })
    }

    /// The text the tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn items(&self) -> &[Item] {
        &self.file.items
    }

    /// Names of every top-level `fn`, in declaration order.
    pub fn function_names(&self) -> Vec<String> {
        self.file
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Fn(func) => Some(func.sig.ident.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Serialize the whole tree. Formatting is normalized, so the output is
    /// behaviorally (not byte-for-byte) equal to the input.
    pub fn to_source(&self) -> String {
        prettyplease::unparse(&self.file)
    }
}

/// Serialize a single function declaration.
pub fn unparse_item_fn(decl: &ItemFn) -> String {
    unparse_items(std::iter::once(Item::Fn(decl.clone())))
}

/// Serialize a sequence of items as if they formed one file.
pub fn unparse_items(items: impl IntoIterator<Item = Item>) -> String {
    let file = File {
        shebang: None,
        attrs: Vec::new(),
        items: items.into_iter().collect(),
    };
    prettyplease::unparse(&file)
}
