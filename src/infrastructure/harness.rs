//! Execution Harness
//!
//! Writes a program to a transient unit, hands it to the toolchain and
//! captures the result. The unit is owned by a guard: it is removed when the
//! guard is closed on the normal path, or dropped on any early return or
//! panic.

use crate::domain::error::{Result, TraceError};
use crate::domain::execution::{Execution, ExecutionFailure, Stage};
use crate::ports::{RunStatus, Toolchain, ToolchainOutput, TransientStore, TransientUnit};

/// Scoped ownership of one transient unit.
pub struct TransientGuard<'s> {
    store: &'s dyn TransientStore,
    unit: TransientUnit,
    released: bool,
}

impl<'s> TransientGuard<'s> {
    pub fn acquire(store: &'s dyn TransientStore, contents: &str) -> Result<Self> {
        let unit = store
            .create(contents)
            .map_err(|e| TraceError::storage("writing the transient program", e))?;
        Ok(Self {
            store,
            unit,
            released: false,
        })
    }

    pub fn unit(&self) -> &TransientUnit {
        &self.unit
    }

    /// Remove the unit now, surfacing any removal error.
    pub fn close(mut self) -> Result<()> {
        self.released = true;
        self.store
            .remove(&self.unit)
            .map_err(|e| TraceError::storage("removing the transient program", e))
    }
}

impl Drop for TransientGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.store.remove(&self.unit) {
            tracing::warn!(
                path = %self.unit.root.display(),
                error = %e,
                "[Harness] failed to remove transient unit"
            );
        }
    }
}

fn into_execution(output: ToolchainOutput) -> Execution {
    match output.status {
        RunStatus::Success => Execution::success(output.stdout),
        RunStatus::Failed { stage, code } => {
            let diagnostics = if output.stderr.trim().is_empty() {
                output.stdout.clone()
            } else {
                output.stderr
            };
            Execution::failed(
                output.stdout,
                ExecutionFailure {
                    stage,
                    status: code,
                    diagnostics,
                },
            )
        }
    }
}

/// Build and run `program` in a fresh transient unit.
///
/// Toolchain failures come back inside the [`Execution`]; only storage
/// problems are errors. Blocks until the toolchain finishes, with no timeout.
pub fn run_transient(
    store: &dyn TransientStore,
    toolchain: &dyn Toolchain,
    program: &str,
) -> Result<Execution> {
    let guard = TransientGuard::acquire(store, program)?;
    tracing::info!(path = %guard.unit().source.display(), "[Harness] building and running");

    let execution = match toolchain.build_and_run(&guard.unit().source) {
        Ok(output) => into_execution(output),
        Err(e) => Execution::failed(
            String::new(),
            ExecutionFailure {
                stage: Stage::Launch,
                status: None,
                diagnostics: e.to_string(),
            },
        ),
    };

    guard.close()?;
    Ok(execution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_is_used_when_stderr_is_empty() {
        let exec = into_execution(ToolchainOutput {
            stdout: "thread 'main' panicked".to_string(),
            stderr: "  \n".to_string(),
            status: RunStatus::Failed {
                stage: Stage::Run,
                code: Some(101),
            },
        });
        let failure = exec.failure.unwrap();
        assert_eq!(failure.stage, Stage::Run);
        assert_eq!(failure.status, Some(101));
        assert_eq!(failure.diagnostics, "thread 'main' panicked");
    }

    #[test]
    fn success_keeps_stdout() {
        let exec = into_execution(ToolchainOutput {
            stdout: "fact(0)\n".to_string(),
            stderr: "warning: unused".to_string(),
            status: RunStatus::Success,
        });
        assert!(exec.is_success());
        assert_eq!(exec.stdout, "fact(0)\n");
    }
}
