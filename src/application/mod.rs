use crate::domain::error::{Result, TraceError};
use crate::domain::execution::Execution;
use crate::domain::instrument::{instrument, InstrumentReport};
use crate::domain::locate::locate;
use crate::domain::synth::{context_items, parse_arguments, synthesize, ProgramSpec};
use crate::domain::tree::SyntaxTree;
use crate::infrastructure::harness::run_transient;
use crate::ports::{Toolchain, TransientStore};

/// What to trace and how to drive it.
#[derive(Debug, Clone, Default)]
pub struct TraceOptions {
    pub function: String,
    /// Initial arguments as Rust expression text, depth excluded.
    pub arguments: Vec<String>,
    /// Carry the other top-level items of the source into the program.
    pub include_context: bool,
}

/// A synthesized program, ready to run.
#[derive(Debug, Clone)]
pub struct PreparedProgram {
    pub report: InstrumentReport,
    pub program: String,
}

#[derive(Debug, Clone)]
pub struct TraceOutcome {
    pub report: InstrumentReport,
    pub program: String,
    pub execution: Execution,
}

/// Parse, locate, instrument and synthesize, without running anything.
///
/// The initial arguments must match the target's parameter count; a
/// mismatch is rejected here instead of surfacing as a build failure.
pub fn prepare(source: &str, options: &TraceOptions) -> Result<PreparedProgram> {
    let arguments = parse_arguments(&options.arguments)?;
    let mut tree = SyntaxTree::parse(source)?;
    let context = if options.include_context {
        Some(context_items(&tree, &options.function)?)
    } else {
        None
    };

    let mut handle = locate(&mut tree, &options.function)?;
    if arguments.len() != handle.original_arity() {
        return Err(TraceError::ArgumentCount {
            function: handle.name().to_string(),
            expected: handle.original_arity(),
            given: arguments.len(),
        });
    }
    let report = instrument(&mut handle)?;
    let spec = ProgramSpec {
        declaration: handle.to_source(),
        entry_point: handle.name().to_string(),
        arguments,
        context,
    };

    Ok(PreparedProgram {
        report,
        program: synthesize(&spec),
    })
}

/// The full pipeline over a storage and a toolchain.
pub struct TraceUsecase<'a> {
    pub store: &'a dyn TransientStore,
    pub toolchain: &'a dyn Toolchain,
}

impl<'a> TraceUsecase<'a> {
    pub fn run(&self, source: &str, options: &TraceOptions) -> Result<TraceOutcome> {
        let prepared = prepare(source, options)?;
        let execution = run_transient(self.store, self.toolchain, &prepared.program)?;
        Ok(TraceOutcome {
            report: prepared.report,
            program: prepared.program,
            execution,
        })
    }
}
