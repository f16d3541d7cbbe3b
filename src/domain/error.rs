// Error taxonomy for the rectrace pipeline.

use crate::domain::execution::ExecutionFailure;
use thiserror::Error;

/// Every way an instrumentation pass can fail.
///
/// Transform steps return the first error they hit and the pipeline stops
/// there. Execution failures are only raised through
/// [`Execution::into_result`](crate::domain::execution::Execution::into_result);
/// the harness itself reports them as values.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Function '{name}' not found among top-level declarations")]
    NotFound { name: String },

    #[error("Function '{function}' takes {expected} argument(s) but {given} were given")]
    ArgumentCount {
        function: String,
        expected: usize,
        given: usize,
    },

    #[error("Cannot instrument {kind}: {detail}")]
    TransformInvariant { kind: String, detail: String },

    #[error("Storage error while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Execution(ExecutionFailure),
}

impl TraceError {
    /// Build a parse error from a `syn` diagnostic, using the span start as the
    /// position. Columns are reported 1-based.
    pub fn from_syn(err: &syn::Error) -> Self {
        let start = err.span().start();
        Self::Parse {
            line: start.line,
            column: start.column + 1,
            message: err.to_string(),
        }
    }

    pub fn invariant(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TransformInvariant {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_position() {
        let err = syn::parse_file("fn broken(: i32) {}").unwrap_err();
        match TraceError::from_syn(&err) {
            TraceError::Parse { line, column, .. } => {
                assert_eq!(line, 1);
                assert!(column >= 1);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn messages_name_the_offender() {
        let err = TraceError::NotFound { name: "doesNotExist".to_string() };
        assert!(err.to_string().contains("doesNotExist"));

        let err = TraceError::invariant("tuple pattern parameter", "expected an identifier");
        assert!(err.to_string().contains("tuple pattern parameter"));
    }
}
