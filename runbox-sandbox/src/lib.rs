//! runbox sandbox - screened, deadline-bounded code execution
//!
//! Accepts a snippet of interpreted code, screens it for dangerous imports
//! and dynamic-evaluation calls, and runs accepted code in a fresh
//! interpreter process with a hard wall-clock deadline.

mod config;
mod error;
mod execution;
mod limits;
mod policy;
mod runtime;
mod screener;
mod service;
mod types;

pub use config::{InterpreterConfig, SandboxConfig};
pub use error::{ProtocolError, Result, SandboxError};
pub use execution::{ExecutionId, ExecutionPhase, ExecutionTracker};
pub use limits::{ExecutionLimits, DEFAULT_GRACE_PERIOD, DEFAULT_TIMEOUT};
pub use policy::{ScreeningPolicy, DEFAULT_ALLOWED_MODULES, DEFAULT_BLOCKED_MODULES};
pub use runtime::{ProcessRuntime, Runtime};
pub use screener::{CodeScreener, Rejection};
pub use service::SandboxService;
pub use types::{ExecutionOutcome, ExecutionRequest, ExecutionResponse};
