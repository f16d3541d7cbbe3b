// Command-line entry point for rectrace.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use rectrace::api::dto::TraceReportDto;
use rectrace::application::{prepare, TraceOptions, TraceUsecase};
use rectrace::config::HarnessConfig;
use rectrace::infrastructure::{concurrency, RustcToolchain, TempDirStore};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rust source file containing the function to trace
    #[arg(short, long)]
    input: PathBuf,

    /// Top-level function to instrument (can specify multiple)
    #[arg(short, long = "function", required = true)]
    functions: Vec<String>,

    /// Initial argument expression, in order (e.g. --arg 4). Shared by every
    /// --function target; a target with a different parameter count is rejected
    #[arg(short, long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Also embed the other top-level items of the input
    #[arg(long)]
    with_context: bool,

    /// Print the synthesized program instead of running it
    #[arg(long)]
    emit: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Worker threads when tracing several functions
    #[arg(short, long)]
    jobs: Option<usize>,

    /// TOML config file with a [toolchain] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compiler to use (overrides config)
    #[arg(long)]
    rustc: Option<String>,

    /// Rust edition for the synthesized program (overrides config)
    #[arg(long)]
    edition: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let directive = if verbose { "rectrace=debug" } else { "rectrace=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn options_for(cli: &Cli, function: &str) -> TraceOptions {
    TraceOptions {
        function: function.to_string(),
        arguments: cli.args.clone(),
        include_context: cli.with_context,
    }
}

fn emit_programs(cli: &Cli, source: &str) -> Result<bool> {
    let mut ok = true;
    for function in &cli.functions {
        match prepare(source, &options_for(cli, function)) {
            Ok(prepared) => print!("{}", prepared.program),
            Err(e) => {
                eprintln!("Error: {}: {}", function, e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn run(cli: &Cli) -> Result<bool> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Cannot read input file {}", cli.input.display()))?;

    if cli.emit {
        return emit_programs(cli, &source);
    }

    let config = HarnessConfig::load(cli.config.as_deref())?
        .with_overrides(cli.rustc.clone(), cli.edition.clone());
    let toolchain = RustcToolchain::new(config);
    let store = TempDirStore::new();
    let usecase = TraceUsecase {
        store: &store,
        toolchain: &toolchain,
    };

    if cli.functions.len() > 1 {
        concurrency::init_thread_pool(cli.jobs)?;
    }

    // Each target is its own invocation: own tree, own transient unit.
    let results: Vec<_> = cli
        .functions
        .par_iter()
        .map(|function| (function, usecase.run(&source, &options_for(cli, function))))
        .collect();

    let mut ok = true;
    for (function, result) in results {
        match (cli.format, result) {
            (Format::Text, Ok(outcome)) => {
                print!("{}", outcome.execution.stdout);
                if let Some(failure) = &outcome.execution.failure {
                    eprintln!("Error: {}: {}", function, failure);
                    ok = false;
                }
            }
            (Format::Text, Err(e)) => {
                eprintln!("Error: {}: {}", function, e);
                ok = false;
            }
            (Format::Json, Ok(outcome)) => {
                ok &= outcome.execution.is_success();
                let dto = TraceReportDto::from_execution(function, &outcome.execution);
                println!("{}", serde_json::to_string(&dto)?);
            }
            (Format::Json, Err(e)) => {
                ok = false;
                let dto = TraceReportDto::from_error(function, &e);
                println!("{}", serde_json::to_string(&dto)?);
            }
        }
    }
    Ok(ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
