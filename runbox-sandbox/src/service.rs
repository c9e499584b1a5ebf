//! Sandbox service - main entry point

use crate::config::SandboxConfig;
use crate::error::{ProtocolError, Result};
use crate::execution::ExecutionId;
use crate::limits::ExecutionLimits;
use crate::runtime::{ProcessRuntime, Runtime};
use crate::screener::CodeScreener;
use crate::types::{ExecutionOutcome, ExecutionRequest};
use std::sync::Arc;
use std::time::Duration;

/// Screens requests and hands accepted code to a runtime.
///
/// Cheap to clone; all state is immutable and shared.
#[derive(Clone)]
pub struct SandboxService {
    runtime: Arc<dyn Runtime>,
    screener: Arc<CodeScreener>,
    limits: ExecutionLimits,
}

impl SandboxService {
    /// Create a new sandbox service with the given runtime
    pub fn new(runtime: impl Runtime + 'static, screener: CodeScreener, limits: ExecutionLimits) -> Self {
        Self {
            runtime: Arc::new(runtime),
            screener: Arc::new(screener),
            limits,
        }
    }

    /// Build the process-backed service described by `config`
    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        config.validate()?;

        let runtime = ProcessRuntime::new(config.interpreter.clone())
            .with_grace_period(config.limits.grace_period);
        let screener = CodeScreener::new(config.policy.clone())?;

        Ok(Self::new(runtime, screener, config.limits.clone()))
    }

    /// Handle one execution request.
    ///
    /// A missing or empty `code` is a protocol error and never reaches
    /// screening. Screening rejections come back as
    /// [`ExecutionOutcome::Rejected`] without a process being spawned.
    pub async fn handle(
        &self,
        request: ExecutionRequest,
    ) -> std::result::Result<ExecutionOutcome, ProtocolError> {
        let code = request.code().ok_or(ProtocolError::MissingCode)?;

        if let Some(rejection) = self.screener.screen(code) {
            tracing::info!(
                code_len = code.len(),
                reason = %rejection,
                "Rejected code during screening"
            );
            return Ok(ExecutionOutcome::Rejected {
                reason: rejection.to_string(),
            });
        }

        let id = ExecutionId::new();
        let timeout = self.effective_timeout(request.timeout_ms);
        tracing::info!(
            execution_id = %id,
            runtime = self.runtime.name(),
            code_len = code.len(),
            timeout_ms = timeout.as_millis() as u64,
            "Executing code"
        );

        let outcome = self.runtime.run(id, code, timeout).await;

        tracing::info!(
            execution_id = %id,
            outcome = outcome.kind(),
            elapsed_ms = outcome.elapsed_ms(),
            "Execution finished"
        );
        Ok(outcome)
    }

    /// Deadline applied to a request asking for `requested_ms`
    pub fn effective_timeout(&self, requested_ms: Option<f64>) -> Duration {
        self.limits.effective_timeout(requested_ms)
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    pub fn screener(&self) -> &CodeScreener {
        &self.screener
    }

    /// Get the runtime name
    pub fn runtime_name(&self) -> &str {
        self.runtime.name()
    }
}
