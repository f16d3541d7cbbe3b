//! Visitor framework
//!
//! A single traversal contract shared by every instrumentation pass. A
//! [`Visitor`] sees each node once, as a [`NodeMut`], and answers with a
//! [`Flow`]:
//!
//! - `Continue` descends into the node's children,
//! - `Skip` leaves the subtree alone,
//! - `Replace(node)` swaps in an owned node of the same kind, then descends
//!   into the replacement.
//!
//! Visitors are also free to edit the node through the `NodeMut` reference
//! before answering, so both in-place edits and replacements are supported.
//!
//! The walk itself is driven by `syn::visit_mut`, which knows every
//! expression and statement shape. Macro invocations whose tokens parse as a
//! comma-separated expression list (`println!`, `assert_eq!`, `vec![a, b]`)
//! are walked too; their tokens are rewritten only when a visitor changed
//! something inside them.
//!
//! ```ignore
//! struct CountCalls(usize);
//!
//! impl Visitor for CountCalls {
//!     fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow> {
//!         if let NodeMut::Expr(syn::Expr::Call(_)) = node {
//!             self.0 += 1;
//!         }
//!         Ok(Flow::Continue)
//!     }
//! }
//! ```

use crate::domain::error::{Result, TraceError};
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};
use syn::{Block, Expr, File, Item, ItemFn, Signature, Stmt, Token};

/// Mutable view of the node kinds a visitor can intercept.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Item(&'a mut Item),
    Signature(&'a mut Signature),
    Block(&'a mut Block),
    Stmt(&'a mut Stmt),
    Expr(&'a mut Expr),
}

impl NodeMut<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeMut::Item(_) => "item",
            NodeMut::Signature(_) => "signature",
            NodeMut::Block(_) => "block",
            NodeMut::Stmt(_) => "statement",
            NodeMut::Expr(_) => "expression",
        }
    }
}

/// An owned replacement node.
#[derive(Debug, Clone)]
pub enum Node {
    Item(Item),
    Signature(Signature),
    Block(Block),
    Stmt(Stmt),
    Expr(Expr),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Item(_) => "item",
            Node::Signature(_) => "signature",
            Node::Block(_) => "block",
            Node::Stmt(_) => "statement",
            Node::Expr(_) => "expression",
        }
    }
}

/// What the driver should do after a visit.
#[derive(Debug)]
pub enum Flow {
    Continue,
    Skip,
    Replace(Node),
}

pub trait Visitor {
    fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow>;
}

/// Walk every top-level item of a file.
pub fn walk_file<V: Visitor + ?Sized>(visitor: &mut V, file: &mut File) -> Result<()> {
    let mut driver = Driver::new(visitor);
    for item in file.items.iter_mut() {
        driver.visit_item_mut(item);
        if driver.error.is_some() {
            break;
        }
    }
    driver.finish()
}

/// Walk one function declaration: signature first, then body.
pub fn walk_item_fn<V: Visitor + ?Sized>(visitor: &mut V, decl: &mut ItemFn) -> Result<()> {
    let mut driver = Driver::new(visitor);
    driver.visit_item_fn_mut(decl);
    driver.finish()
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &mut Block) -> Result<()> {
    let mut driver = Driver::new(visitor);
    driver.visit_block_mut(block);
    driver.finish()
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &mut Expr) -> Result<()> {
    let mut driver = Driver::new(visitor);
    driver.visit_expr_mut(expr);
    driver.finish()
}

/// Node kinds the driver can hand to a visitor.
trait Visitable: Sized {
    fn as_node(&mut self) -> NodeMut<'_>;
    fn from_node(node: Node) -> std::result::Result<Self, Node>;
    fn kind() -> &'static str;
}

macro_rules! visitable {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl Visitable for $ty {
            fn as_node(&mut self) -> NodeMut<'_> {
                NodeMut::$variant(self)
            }

            fn from_node(node: Node) -> std::result::Result<Self, Node> {
                match node {
                    Node::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }

            fn kind() -> &'static str {
                $kind
            }
        }
    };
}

visitable!(Item, Item, "item");
visitable!(Signature, Signature, "signature");
visitable!(Block, Block, "block");
visitable!(Stmt, Stmt, "statement");
visitable!(Expr, Expr, "expression");

/// Adapts a [`Visitor`] to `syn`'s `VisitMut`. The first error is latched
/// and stops all further visiting.
struct Driver<'v, V: Visitor + ?Sized> {
    visitor: &'v mut V,
    error: Option<TraceError>,
}

impl<'v, V: Visitor + ?Sized> Driver<'v, V> {
    fn new(visitor: &'v mut V) -> Self {
        Self { visitor, error: None }
    }

    fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Visit one node and report whether to descend into it.
    fn step<T: Visitable>(&mut self, node: &mut T) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.visitor.visit(node.as_node()) {
            Ok(Flow::Continue) => true,
            Ok(Flow::Skip) => false,
            Ok(Flow::Replace(replacement)) => match T::from_node(replacement) {
                Ok(new) => {
                    *node = new;
                    true
                }
                Err(other) => {
                    self.error = Some(TraceError::invariant(
                        T::kind(),
                        format!("visitor tried to replace it with a {}", other.kind()),
                    ));
                    false
                }
            },
            Err(err) => {
                self.error = Some(err);
                false
            }
        }
    }
}

impl<V: Visitor + ?Sized> VisitMut for Driver<'_, V> {
    fn visit_item_mut(&mut self, item: &mut Item) {
        if self.step(item) {
            visit_mut::visit_item_mut(self, item);
        }
    }

    fn visit_signature_mut(&mut self, sig: &mut Signature) {
        if self.step(sig) {
            visit_mut::visit_signature_mut(self, sig);
        }
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        if self.step(block) {
            visit_mut::visit_block_mut(self, block);
        }
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        if self.step(stmt) {
            visit_mut::visit_stmt_mut(self, stmt);
        }
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if self.step(expr) {
            visit_mut::visit_expr_mut(self, expr);
        }
    }

    fn visit_macro_mut(&mut self, mac: &mut syn::Macro) {
        if self.error.is_some() {
            return;
        }
        let parser = Punctuated::<Expr, Token![,]>::parse_terminated;
        let Ok(mut args) = mac.parse_body_with(parser) else {
            return;
        };
        let before = args.to_token_stream().to_string();
        for arg in args.iter_mut() {
            self.visit_expr_mut(arg);
        }
        if self.error.is_none() {
            let after = args.to_token_stream();
            if after.to_string() != before {
                mac.tokens = after;
            }
        }
    }
}
