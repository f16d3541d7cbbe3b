// Infrastructure implementations for rectrace: transient storage, the rustc
// toolchain, the execution harness and the worker pool.

pub mod concurrency;
pub mod harness;
pub mod rustc;
pub mod storage;

pub use harness::{run_transient, TransientGuard};
pub use rustc::RustcToolchain;
pub use storage::TempDirStore;
