// Domain layer for rectrace: the syntax tree, the visitor framework and the
// instrumentation passes built on it.

pub mod error;
pub mod execution;
pub mod instrument;
pub mod locate;
pub mod synth;
pub mod tree;
pub mod visit;
