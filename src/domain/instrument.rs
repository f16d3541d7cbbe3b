//! Instrumentation passes
//!
//! Three edits applied to one located function, always in this order:
//!
//! 1. [`augment`] appends a `depth: usize` parameter,
//! 2. [`rewrite_recursive_calls`] appends `depth + 1` to every self-call,
//! 3. [`inject_trace`] prepends a statement printing the call.
//!
//! Each pass is a [`Visitor`] handling one node kind. None of them is
//! idempotent: running a pass twice applies its edit twice.

use crate::domain::error::{Result, TraceError};
use crate::domain::locate::FunctionHandle;
use crate::domain::visit::{walk_file, walk_item_fn, Flow, NodeMut, Visitor};
use quote::format_ident;
use syn::ext::IdentExt;
use syn::{parse_quote, Expr, File, FnArg, Ident, Pat, Stmt, Type};

/// Name of the parameter threaded through recursive calls.
pub const DEPTH_PARAM: &str = "depth";

/// One formal parameter of the instrumented function.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Ident,
    pub ty: Type,
}

/// What a full instrumentation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentReport {
    pub function: String,
    pub original_arity: usize,
    pub rewritten_calls: usize,
}

/// Run all three passes in order.
pub fn instrument(handle: &mut FunctionHandle<'_>) -> Result<InstrumentReport> {
    augment(handle)?;
    let rewritten_calls = rewrite_recursive_calls(handle)?;
    inject_trace(handle)?;
    tracing::info!(
        function = handle.name(),
        rewritten = rewritten_calls,
        "[Instrument] function instrumented"
    );
    Ok(InstrumentReport {
        function: handle.name().to_string(),
        original_arity: handle.original_arity(),
        rewritten_calls,
    })
}

/// The parameters the function had when it was located.
pub fn original_parameters(handle: &FunctionHandle<'_>) -> Result<Vec<Parameter>> {
    handle
        .decl()
        .sig
        .inputs
        .iter()
        .take(handle.original_arity())
        .map(|arg| match arg {
            FnArg::Receiver(_) => Err(TraceError::invariant(
                "self receiver",
                format!("'{}' is not a free function", handle.name()),
            )),
            FnArg::Typed(typed) => match &*typed.pat {
                Pat::Ident(pat) if pat.subpat.is_none() => Ok(Parameter {
                    name: pat.ident.clone(),
                    ty: (*typed.ty).clone(),
                }),
                other => Err(TraceError::invariant(
                    pattern_kind(other),
                    format!(
                        "parameters of '{}' must be plain identifiers to be traced",
                        handle.name()
                    ),
                )),
            },
        })
        .collect()
}

fn pattern_kind(pat: &Pat) -> &'static str {
    match pat {
        Pat::Ident(_) => "binding pattern parameter",
        Pat::Tuple(_) => "tuple pattern parameter",
        Pat::TupleStruct(_) => "tuple struct pattern parameter",
        Pat::Struct(_) => "struct pattern parameter",
        Pat::Slice(_) => "slice pattern parameter",
        Pat::Reference(_) => "reference pattern parameter",
        Pat::Wild(_) => "wildcard parameter",
        _ => "pattern parameter",
    }
}

// ---------------------------------------------------------------------------
// Signature augmenter
// ---------------------------------------------------------------------------

struct SignatureAugmenter;

impl Visitor for SignatureAugmenter {
    fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow> {
        match node {
            NodeMut::Signature(sig) => {
                if sig.variadic.is_some() {
                    return Err(TraceError::invariant(
                        "variadic signature",
                        format!("cannot append a parameter after '...' in '{}'", sig.ident),
                    ));
                }
                let depth = format_ident!("{}", DEPTH_PARAM);
                sig.inputs.push(parse_quote!(#depth: usize));
                Ok(Flow::Skip)
            }
            NodeMut::Block(_) => Ok(Flow::Skip),
            _ => Ok(Flow::Continue),
        }
    }
}

/// Append `depth: usize` to the end of the parameter list.
pub fn augment(handle: &mut FunctionHandle<'_>) -> Result<()> {
    walk_item_fn(&mut SignatureAugmenter, handle.decl_mut())
}

// ---------------------------------------------------------------------------
// Recursive-call rewriter
// ---------------------------------------------------------------------------

struct RecursiveCallRewriter<'n> {
    name: &'n str,
    rewritten: usize,
}

impl Visitor for RecursiveCallRewriter<'_> {
    fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow> {
        match node {
            NodeMut::Signature(_) => Ok(Flow::Skip),
            // Inner items have no `depth` in scope.
            NodeMut::Item(_) => Ok(Flow::Skip),
            NodeMut::Expr(Expr::Call(call)) => {
                if is_self_call(&call.func, self.name) {
                    call.args.push(depth_increment());
                    self.rewritten += 1;
                }
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Continue),
        }
    }
}

/// A self-call is a call whose callee is a single-segment path naming the
/// function. No binding resolution happens: a local closure shadowing the
/// function's name is treated as a recursive call too.
fn is_self_call(callee: &Expr, name: &str) -> bool {
    match callee {
        Expr::Path(path) if path.qself.is_none() && path.path.leading_colon.is_none() => {
            let segments = &path.path.segments;
            segments.len() == 1 && segments.first().map_or(false, |seg| seg.ident == name)
        }
        _ => false,
    }
}

fn depth_increment() -> Expr {
    let depth = format_ident!("{}", DEPTH_PARAM);
    parse_quote!(#depth + 1)
}

/// Append `depth + 1` to every self-call in the body. Returns how many call
/// sites were rewritten.
pub fn rewrite_recursive_calls(handle: &mut FunctionHandle<'_>) -> Result<usize> {
    let name = handle.name().to_string();
    let mut rewriter = RecursiveCallRewriter {
        name: &name,
        rewritten: 0,
    };
    walk_item_fn(&mut rewriter, handle.decl_mut())?;
    tracing::debug!(function = %name, rewritten = rewriter.rewritten, "[Instrument] rewrote self-calls");
    Ok(rewriter.rewritten)
}

// ---------------------------------------------------------------------------
// External callers
// ---------------------------------------------------------------------------

/// Rewrites calls to the instrumented function made from other items. Those
/// callers have no `depth` in scope, so every such call starts at depth `0`.
struct ExternalCallRewriter<'n> {
    name: &'n str,
    rewritten: usize,
}

impl Visitor for ExternalCallRewriter<'_> {
    fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow> {
        if let NodeMut::Expr(Expr::Call(call)) = node {
            if is_self_call(&call.func, self.name) {
                call.args.push(parse_quote!(0));
                self.rewritten += 1;
            }
        }
        Ok(Flow::Continue)
    }
}

/// Append a starting depth of `0` to every call to `function` inside `file`.
/// Returns how many call sites were rewritten.
pub fn rewrite_external_calls(file: &mut File, function: &str) -> Result<usize> {
    let mut rewriter = ExternalCallRewriter {
        name: function,
        rewritten: 0,
    };
    walk_file(&mut rewriter, file)?;
    Ok(rewriter.rewritten)
}

// ---------------------------------------------------------------------------
// Entry-trace injector
// ---------------------------------------------------------------------------

/// Format string plus arguments for the entry trace of one function.
#[derive(Debug, Clone)]
pub struct TraceTemplate {
    pub format: String,
    pub args: Vec<Expr>,
}

impl TraceTemplate {
    /// `{}name(..)` with the dash indentation as the first argument,
    /// followed by each parameter read by name.
    ///
    /// Text parameters (`str`, `String`, `char`, behind any references) are
    /// printed with `{}`, so they appear without quotes. Everything else uses
    /// `{:?}` and must implement `Debug`.
    pub fn new(function: &str, params: &[Parameter]) -> Self {
        let placeholders: Vec<&str> = params.iter().map(|p| placeholder(&p.ty)).collect();
        let placeholders = placeholders.join(", ");
        let format = format!("{{}}{}({})", function, placeholders);

        let depth = format_ident!("{}", DEPTH_PARAM);
        let mut args: Vec<Expr> = Vec::with_capacity(params.len() + 1);
        args.push(parse_quote!("-".repeat(#depth)));
        for param in params {
            let ident = &param.name;
            args.push(parse_quote!(#ident));
        }
        Self { format, args }
    }

    pub fn to_stmt(&self) -> Stmt {
        let format = &self.format;
        let args = &self.args;
        parse_quote! {
            ::std::println!(#format #(, #args)*);
        }
    }
}

fn placeholder(ty: &Type) -> &'static str {
    match ty {
        Type::Reference(reference) => placeholder(&reference.elem),
        Type::Paren(paren) => placeholder(&paren.elem),
        Type::Group(group) => placeholder(&group.elem),
        Type::Path(path) if path.qself.is_none() => match path.path.segments.last() {
            Some(seg) if seg.arguments.is_none() && is_text_type(&seg.ident) => "{}",
            _ => "{:?}",
        },
        _ => "{:?}",
    }
}

fn is_text_type(ident: &Ident) -> bool {
    ident == "str" || ident == "String" || ident == "char"
}

struct TraceInjector {
    stmt: Option<Stmt>,
}

impl Visitor for TraceInjector {
    fn visit(&mut self, node: NodeMut<'_>) -> Result<Flow> {
        match node {
            NodeMut::Signature(_) => Ok(Flow::Skip),
            NodeMut::Block(body) => {
                if let Some(stmt) = self.stmt.take() {
                    body.stmts.insert(0, stmt);
                }
                Ok(Flow::Skip)
            }
            _ => Ok(Flow::Continue),
        }
    }
}

/// Prepend the entry trace to the function body.
pub fn inject_trace(handle: &mut FunctionHandle<'_>) -> Result<()> {
    let params = original_parameters(handle)?;
    let function = handle.decl().sig.ident.unraw().to_string();
    let template = TraceTemplate::new(&function, &params);
    let mut injector = TraceInjector {
        stmt: Some(template.to_stmt()),
    };
    walk_item_fn(&mut injector, handle.decl_mut())
}
