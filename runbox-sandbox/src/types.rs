//! Core types for sandbox execution

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to execute code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The code to execute. `None` and empty are both protocol errors.
    #[serde(default)]
    pub code: Option<String>,

    /// Requested deadline in milliseconds. Values below 1 ms fall back to the
    /// configured default.
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<f64>,
}

impl ExecutionRequest {
    /// Create a simple execution request
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            timeout_ms: None,
        }
    }

    /// Set timeout in milliseconds
    pub fn with_timeout_ms(mut self, ms: f64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Parse a request from a raw JSON body, which must be an object
    pub fn from_json(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(ProtocolError::InvalidBody(
                "expected a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The code to run, if present and non-empty
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }
}

/// Terminal result of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Exit code 0; `stdout` is trimmed.
    Success { stdout: String, elapsed_ms: u64 },

    /// Screening refused the code. No process was spawned.
    Rejected { reason: String },

    /// Non-zero exit, crash, or spawn failure.
    Failed { reason: String, elapsed_ms: u64 },

    /// Deadline fired; the process was terminated.
    TimedOut { timeout_ms: u64, elapsed_ms: u64 },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            ExecutionOutcome::Success { elapsed_ms, .. }
            | ExecutionOutcome::Failed { elapsed_ms, .. }
            | ExecutionOutcome::TimedOut { elapsed_ms, .. } => *elapsed_ms,
            ExecutionOutcome::Rejected { .. } => 0,
        }
    }

    /// Failure reason, `None` on success
    pub fn reason(&self) -> Option<String> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Rejected { reason } | ExecutionOutcome::Failed { reason, .. } => {
                Some(reason.clone())
            }
            ExecutionOutcome::TimedOut { timeout_ms, .. } => {
                Some(format!("Timeout exceeded {}ms", timeout_ms))
            }
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionOutcome::Success { .. } => "success",
            ExecutionOutcome::Rejected { .. } => "rejected",
            ExecutionOutcome::Failed { .. } => "failed",
            ExecutionOutcome::TimedOut { .. } => "timed_out",
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {} ({}ms)", self.kind(), reason, self.elapsed_ms()),
            None => write!(f, "{} ({}ms)", self.kind(), self.elapsed_ms()),
        }
    }
}

/// JSON body returned by `POST /execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub execution_time_ms: u64,
}

impl ExecutionResponse {
    /// Response for a request that never reached screening
    pub fn protocol_error(error: &ProtocolError) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.to_string()),
            execution_time_ms: 0,
        }
    }
}

impl From<&ExecutionOutcome> for ExecutionResponse {
    fn from(outcome: &ExecutionOutcome) -> Self {
        match outcome {
            ExecutionOutcome::Success { stdout, elapsed_ms } => Self {
                success: true,
                output: Some(stdout.clone()),
                error: None,
                execution_time_ms: *elapsed_ms,
            },
            other => Self {
                success: false,
                output: None,
                error: other.reason(),
                execution_time_ms: other.elapsed_ms(),
            },
        }
    }
}

impl From<ExecutionOutcome> for ExecutionResponse {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self::from(&outcome)
    }
}
