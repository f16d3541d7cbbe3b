//! Program synthesizer
//!
//! Wraps an instrumented declaration into a complete, runnable program: a
//! lint header, a `main` driver calling the entry point with the initial
//! arguments plus a starting depth of `0`, optional context items, and the
//! declaration text verbatim.

use crate::domain::error::{Result, TraceError};
use crate::domain::instrument::rewrite_external_calls;
use crate::domain::tree::{unparse_items, SyntaxTree};
use syn::{Expr, File, Item};

/// Crate-level attributes the instrumented code would otherwise trip. The
/// trace itself only needs `println!` and `str::repeat`, both in the prelude.
const HEADER: &str = "\
// Generated by rectrace.
#![allow(dead_code, unused_imports, unused_mut, unused_parens, unused_variables, unused_must_use)]
";

/// Everything needed to synthesize one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSpec {
    /// Serialized, already-instrumented declaration.
    pub declaration: String,
    /// Function `main` calls.
    pub entry_point: String,
    /// Initial arguments as expression text, depth excluded.
    pub arguments: Vec<String>,
    /// Other top-level items of the source unit, already serialized.
    pub context: Option<String>,
}

/// Build the program text. Identical specs give identical output.
pub fn synthesize(spec: &ProgramSpec) -> String {
    let mut call_args: Vec<&str> = spec.arguments.iter().map(|a| a.trim()).collect();
    call_args.push("0");

    let mut out = String::with_capacity(HEADER.len() + spec.declaration.len() + 128);
    out.push_str(HEADER);
    out.push('\n');
    out.push_str("fn main() {\n");
    out.push_str(&format!("    {}({});\n", spec.entry_point, call_args.join(", ")));
    out.push_str("}\n");

    if let Some(context) = &spec.context {
        if !context.trim().is_empty() {
            out.push('\n');
            out.push_str(context.trim_end());
            out.push('\n');
        }
    }

    out.push('\n');
    out.push_str(spec.declaration.trim_end());
    out.push('\n');
    out
}

/// Check that every initial argument is a Rust expression.
pub fn parse_arguments(arguments: &[String]) -> Result<Vec<String>> {
    arguments
        .iter()
        .map(|arg| {
            syn::parse_str::<Expr>(arg)
                .map(|_| arg.trim().to_string())
                .map_err(|e| match TraceError::from_syn(&e) {
                    TraceError::Parse { line, column, message } => TraceError::Parse {
                        line,
                        column,
                        message: format!("initial argument `{}`: {}", arg, message),
                    },
                    other => other,
                })
        })
        .collect()
}

/// Serialize every top-level item except `main` and the instrumented
/// function, so helpers and types the target uses come along. Calls to the
/// target from these items get a starting depth of `0`.
pub fn context_items(tree: &SyntaxTree, function: &str) -> Result<String> {
    let mut context = File {
        shebang: None,
        attrs: Vec::new(),
        items: tree
            .items()
            .iter()
            .filter(|item| match item {
                Item::Fn(func) => func.sig.ident != "main" && func.sig.ident != function,
                _ => true,
            })
            .cloned()
            .collect(),
    };
    let callers = rewrite_external_calls(&mut context, function)?;
    if callers > 0 {
        tracing::debug!(function, callers, "[Synth] context calls start at depth 0");
    }
    Ok(unparse_items(context.items))
}
