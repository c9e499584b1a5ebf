//! Execution identity and lifecycle tracking

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Unique execution identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one child process.
///
/// `Created → Spawned → Running → (Terminating →) Exited → Resolved`.
/// A spawn failure goes straight from `Created` to `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    Created,
    Spawned,
    Running,
    Terminating,
    Exited,
    Resolved,
}

impl ExecutionPhase {
    pub fn is_terminal(self) -> bool {
        self == ExecutionPhase::Resolved
    }
}

/// Tracks the phase and wall-clock of one execution and logs transitions
#[derive(Debug)]
pub struct ExecutionTracker {
    id: ExecutionId,
    phase: ExecutionPhase,
    started: Instant,
}

impl ExecutionTracker {
    pub fn new(id: ExecutionId) -> Self {
        Self {
            id,
            phase: ExecutionPhase::Created,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> ExecutionId {
        self.id
    }

    pub fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    /// Move forward to `next`. Phases never go backwards and `Resolved`
    /// is final; an out-of-order transition is ignored and logged.
    pub fn advance(&mut self, next: ExecutionPhase) {
        if self.phase.is_terminal() || next <= self.phase {
            tracing::warn!(
                execution_id = %self.id,
                from = ?self.phase,
                to = ?next,
                "Ignoring out-of-order phase transition"
            );
            return;
        }

        tracing::debug!(
            execution_id = %self.id,
            from = ?self.phase,
            to = ?next,
            elapsed_ms = self.elapsed_ms(),
            "Execution phase changed"
        );
        self.phase = next;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
