//! Runtime trait and implementations

mod process;

use crate::execution::ExecutionId;
use crate::types::ExecutionOutcome;
use async_trait::async_trait;
use std::time::Duration;

pub use process::ProcessRuntime;

/// Runtime abstraction for executing screened code
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Run `code` to completion or until `timeout` elapses.
    ///
    /// Implementations resolve every path, including spawn failures, to an
    /// [`ExecutionOutcome`]; they never return `Rejected`.
    async fn run(&self, id: ExecutionId, code: &str, timeout: Duration) -> ExecutionOutcome;

    /// Get runtime name
    fn name(&self) -> &str;
}
