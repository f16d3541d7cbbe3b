use crate::domain::execution::Stage;
use std::io;
use std::path::{Path, PathBuf};

/// A uniquely named transient workspace holding one source file. Anything
/// the toolchain produces goes under `root` and is removed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientUnit {
    pub root: PathBuf,
    pub source: PathBuf,
}

/// Storage for the program being run: create one unit, delete it afterwards.
pub trait TransientStore: Send + Sync {
    fn create(&self, contents: &str) -> io::Result<TransientUnit>;
    fn remove(&self, unit: &TransientUnit) -> io::Result<()>;
}

/// Completion status reported by a [`Toolchain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed { stage: Stage, code: Option<i32> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: RunStatus,
}

/// Compiles and executes one source file. `Err` means the toolchain could
/// not be started; a failed build or run is reported through `status`.
pub trait Toolchain: Send + Sync {
    fn build_and_run(&self, source: &Path) -> io::Result<ToolchainOutput>;
}
