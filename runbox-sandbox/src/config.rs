//! Sandbox configuration, fixed at startup

use crate::error::{Result, SandboxError};
use crate::limits::ExecutionLimits;
use crate::policy::ScreeningPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How to launch the interpreter that reads a program from stdin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Executable, resolved through `PATH` when not absolute
    #[serde(default = "InterpreterConfig::default_program")]
    pub program: String,

    /// Arguments selecting read-program-from-stdin mode
    #[serde(default = "InterpreterConfig::default_args")]
    pub args: Vec<String>,

    /// Variables copied from the server's environment into the child
    #[serde(default = "InterpreterConfig::default_passthrough_env")]
    pub passthrough_env: Vec<String>,

    /// Fixed variables set in the child
    #[serde(default = "InterpreterConfig::default_env")]
    pub env: BTreeMap<String, String>,
}

impl InterpreterConfig {
    fn default_program() -> String {
        "python3".to_string()
    }

    fn default_args() -> Vec<String> {
        vec!["-".to_string()]
    }

    fn default_passthrough_env() -> Vec<String> {
        vec!["PATH".to_string()]
    }

    fn default_env() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("PYTHONDONTWRITEBYTECODE".to_string(), "1".to_string()),
            ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
        ])
    }

    /// Interpreter with no extra environment, e.g. `/bin/sh -s`
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            passthrough_env: Self::default_passthrough_env(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
            args: Self::default_args(),
            passthrough_env: Self::default_passthrough_env(),
            env: Self::default_env(),
        }
    }
}

/// Everything the execution pipeline needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default)]
    pub interpreter: InterpreterConfig,

    #[serde(default)]
    pub limits: ExecutionLimits,

    #[serde(default)]
    pub policy: ScreeningPolicy,
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.program.trim().is_empty() {
            return Err(SandboxError::Config(
                "interpreter program must not be empty".to_string(),
            ));
        }

        if self.limits.default_timeout.is_zero() {
            return Err(SandboxError::Config(
                "default timeout must be greater than zero".to_string(),
            ));
        }

        if self.limits.grace_period.is_zero() {
            return Err(SandboxError::Config(
                "grace period must be greater than zero".to_string(),
            ));
        }

        if let Some(max) = self.limits.max_timeout {
            if max < self.limits.default_timeout {
                return Err(SandboxError::Config(format!(
                    "max timeout ({}ms) is below the default timeout ({}ms)",
                    max.as_millis(),
                    self.limits.default_timeout.as_millis()
                )));
            }
        }

        self.policy.validate()
    }
}
