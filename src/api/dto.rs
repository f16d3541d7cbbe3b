use serde::{Deserialize, Serialize};
use crate::domain::error::TraceError;
use crate::domain::execution::Execution;

/// One traced function, as printed by `--format json`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceReportDto {
    pub function: String,
    pub success: bool,
    pub stdout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceReportDto {
    pub fn from_execution(function: &str, execution: &Execution) -> Self {
        let failure = execution.failure.as_ref();
        TraceReportDto {
            function: function.to_string(),
            success: failure.is_none(),
            stdout: execution.stdout.clone(),
            stage: failure.map(|f| f.stage.to_string()),
            status: failure.and_then(|f| f.status),
            diagnostics: failure.map(|f| f.diagnostics.clone()),
            error: None,
        }
    }

    /// A pipeline error that stopped the run before anything executed.
    pub fn from_error(function: &str, err: &TraceError) -> Self {
        TraceReportDto {
            function: function.to_string(),
            success: false,
            stdout: String::new(),
            stage: None,
            status: None,
            diagnostics: None,
            error: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::{ExecutionFailure, Stage};

    #[test]
    fn success_omits_failure_fields() {
        let dto = TraceReportDto::from_execution("fib", &Execution::success("fib(0)\n".to_string()));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stdout"], "fib(0)\n");
        assert!(json.get("stage").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_carries_stage_and_status() {
        let exec = Execution::failed(
            String::new(),
            ExecutionFailure {
                stage: Stage::Build,
                status: Some(1),
                diagnostics: "error: expected one of".to_string(),
            },
        );
        let dto = TraceReportDto::from_execution("fact", &exec);
        let json = serde_json::to_string(&dto).unwrap();
        let back: TraceReportDto = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stage.as_deref(), Some("build"));
        assert_eq!(back.status, Some(1));
        assert!(!back.success);
    }

    #[test]
    fn pipeline_error_is_reported() {
        let err = TraceError::NotFound { name: "nope".to_string() };
        let dto = TraceReportDto::from_error("nope", &err);
        assert!(dto.error.unwrap().contains("nope"));
    }
}
