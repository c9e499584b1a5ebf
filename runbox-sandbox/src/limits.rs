//! Deadline configuration for sandboxed execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default deadline when a request does not ask for one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Wait between the graceful and the forceful termination signal
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(1_000);

/// Time limits for code execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLimits {
    /// Deadline applied when the request carries no usable timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub default_timeout: Duration,

    /// Wait after SIGTERM before SIGKILL
    #[serde(default = "default_grace_period", with = "humantime_serde")]
    pub grace_period: Duration,

    /// Upper bound on caller-requested deadlines (None = unbounded)
    #[serde(default, with = "humantime_serde")]
    pub max_timeout: Option<Duration>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_grace_period() -> Duration {
    DEFAULT_GRACE_PERIOD
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            max_timeout: None,
        }
    }
}

impl ExecutionLimits {
    /// Resolve the deadline for a request.
    ///
    /// Anything under one millisecond (zero, negative, NaN) means "not
    /// specified" and yields the default.
    pub fn effective_timeout(&self, requested_ms: Option<f64>) -> Duration {
        let timeout = match requested_ms {
            Some(ms) if ms.is_finite() && ms >= 1.0 => Duration::from_millis(ms as u64),
            _ => self.default_timeout,
        };

        match self.max_timeout {
            Some(max) => timeout.min(max),
            None => timeout,
        }
    }

    /// Worst-case lifetime of a single execution
    pub fn worst_case(&self, timeout: Duration) -> Duration {
        timeout + self.grace_period
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn with_max_timeout(mut self, max: Duration) -> Self {
        self.max_timeout = Some(max);
        self
    }
}
