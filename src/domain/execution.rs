//! Execution outcome types
//!
//! The result of building and running a synthesized program. A failing
//! program is a legitimate outcome, so failures live inside [`Execution`]
//! rather than in an `Err`.

use crate::domain::error::{Result, TraceError};
use serde::Serialize;
use std::fmt;

/// Which step of build-and-run went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The toolchain could not be started at all.
    Launch,
    /// Compilation of the synthesized program failed.
    Build,
    /// The compiled program exited unsuccessfully.
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Launch => "launch",
            Stage::Build => "build",
            Stage::Run => "run",
        };
        write!(f, "{}", name)
    }
}

/// Structured detail about a non-zero toolchain exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionFailure {
    pub stage: Stage,
    /// Exit code, `None` when killed by a signal or never started.
    pub status: Option<i32>,
    /// Captured stderr, or stdout when stderr was empty.
    pub diagnostics: String,
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} failed with exit code {}", self.stage, code)?,
            None => write!(f, "{} failed without an exit code", self.stage)?,
        }
        if !self.diagnostics.trim().is_empty() {
            write!(f, ":\n{}", self.diagnostics.trim_end())?;
        }
        Ok(())
    }
}

/// Captured output of one transient run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub stdout: String,
    pub failure: Option<ExecutionFailure>,
}

impl Execution {
    pub fn success(stdout: String) -> Self {
        Self { stdout, failure: None }
    }

    pub fn failed(stdout: String, failure: ExecutionFailure) -> Self {
        Self { stdout, failure: Some(failure) }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Treat a failed run as fatal.
    pub fn into_result(self) -> Result<String> {
        match self.failure {
            None => Ok(self.stdout),
            Some(failure) => Err(TraceError::Execution(failure)),
        }
    }
}
