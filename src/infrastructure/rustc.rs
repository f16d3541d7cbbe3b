/// Rustc toolchain runner.
///
/// Builds a single-file program with `rustc` into the directory that holds
/// the source, then runs the produced binary and captures its output.

use crate::config::HarnessConfig;
use crate::domain::execution::Stage;
use crate::ports::{RunStatus, Toolchain, ToolchainOutput};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Name the compiled program gets next to its source.
const BINARY_NAME: &str = "rectrace_prog";

pub struct RustcToolchain {
    config: HarnessConfig,
}

impl RustcToolchain {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Check that the configured compiler starts and report its version.
    pub fn version(&self) -> io::Result<String> {
        let output = Command::new(&self.config.rustc).arg("--version").output()?;
        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} --version exited with {:?}", self.config.rustc, output.status.code()),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn binary_path(source: &Path) -> PathBuf {
        source.with_file_name(format!("{}{}", BINARY_NAME, std::env::consts::EXE_SUFFIX))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Testable Command Builder
// ═══════════════════════════════════════════════════════════════════════════

/// The compiler invocation that would be run for a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

/// Build the compiler command line without running it.
pub fn build_command_spec(config: &HarnessConfig, source: &Path, binary: &Path) -> BuildCommandSpec {
    let mut args = vec![
        "--edition".to_string(),
        config.edition.clone(),
        "--crate-name".to_string(),
        BINARY_NAME.to_string(),
        "--crate-type".to_string(),
        "bin".to_string(),
    ];
    if config.optimize {
        args.push("-O".to_string());
    }
    args.extend(config.extra_args.iter().cloned());
    args.push("-o".to_string());
    args.push(binary.display().to_string());
    args.push(source.display().to_string());
    BuildCommandSpec {
        program: config.rustc.clone(),
        args,
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn failed(output: &Output, stage: Stage) -> ToolchainOutput {
    ToolchainOutput {
        stdout: lossy(&output.stdout),
        stderr: lossy(&output.stderr),
        status: RunStatus::Failed {
            stage,
            code: output.status.code(),
        },
    }
}

impl Toolchain for RustcToolchain {
    fn build_and_run(&self, source: &Path) -> io::Result<ToolchainOutput> {
        let binary = Self::binary_path(source);
        let spec = build_command_spec(&self.config, source, &binary);

        tracing::debug!(program = %spec.program, args = ?spec.args, "[Rustc] compiling");
        let build = Command::new(&spec.program).args(&spec.args).output()?;
        if !build.status.success() {
            tracing::warn!(code = ?build.status.code(), "[Rustc] build failed");
            return Ok(failed(&build, Stage::Build));
        }

        tracing::debug!(binary = %binary.display(), "[Rustc] running");
        let run = Command::new(&binary).output()?;
        if !run.status.success() {
            tracing::warn!(code = ?run.status.code(), "[Rustc] program exited unsuccessfully");
            return Ok(failed(&run, Stage::Run));
        }

        Ok(ToolchainOutput {
            stdout: lossy(&run.stdout),
            stderr: lossy(&run.stderr),
            status: RunStatus::Success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_spec_orders_output_before_source() {
        let cfg = HarnessConfig {
            rustc: "rustc".to_string(),
            edition: "2021".to_string(),
            optimize: false,
            extra_args: vec![],
        };
        let spec = build_command_spec(&cfg, Path::new("/tmp/x/main.rs"), Path::new("/tmp/x/prog"));
        assert_eq!(spec.program, "rustc");
        assert_eq!(&spec.args[..2], &["--edition".to_string(), "2021".to_string()]);
        let n = spec.args.len();
        assert_eq!(spec.args[n - 3], "-o");
        assert_eq!(spec.args[n - 1], "/tmp/x/main.rs");
        assert!(!spec.args.contains(&"-O".to_string()));
    }

    #[test]
    fn command_spec_honours_optimize_and_extra_args() {
        let cfg = HarnessConfig {
            rustc: "/opt/rustc".to_string(),
            edition: "2018".to_string(),
            optimize: true,
            extra_args: vec!["-C".to_string(), "debug-assertions=on".to_string()],
        };
        let spec = build_command_spec(&cfg, Path::new("main.rs"), Path::new("prog"));
        assert_eq!(spec.program, "/opt/rustc");
        assert!(spec.args.contains(&"-O".to_string()));
        assert!(spec.args.contains(&"debug-assertions=on".to_string()));
    }

    #[test]
    fn binary_lands_next_to_source() {
        let binary = RustcToolchain::binary_path(Path::new("/tmp/unit/main.rs"));
        assert_eq!(binary.parent(), Some(Path::new("/tmp/unit")));
    }

    #[test]
    fn missing_compiler_is_a_launch_error() {
        let toolchain = RustcToolchain::new(HarnessConfig {
            rustc: "/definitely/not/a/rustc".to_string(),
            ..HarnessConfig::default()
        });
        assert!(toolchain.build_and_run(Path::new("main.rs")).is_err());
        assert!(toolchain.version().is_err());
    }
}
