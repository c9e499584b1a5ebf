//! Server configuration
//!
//! Layered lowest to highest: built-in defaults, TOML file, `RUNBOX_*`
//! environment variables, command-line overrides. Fixed once the server
//! starts.

use anyhow::{anyhow, Context, Result};
use runbox_sandbox::SandboxConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_CONFIG: &str = "RUNBOX_CONFIG";
pub const ENV_HOST: &str = "RUNBOX_HOST";
pub const ENV_PORT: &str = "RUNBOX_PORT";
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "RUNBOX_DEFAULT_TIMEOUT_MS";
pub const ENV_GRACE_PERIOD_MS: &str = "RUNBOX_GRACE_PERIOD_MS";
pub const ENV_MAX_TIMEOUT_MS: &str = "RUNBOX_MAX_TIMEOUT_MS";
pub const ENV_INTERPRETER: &str = "RUNBOX_INTERPRETER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,

    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,

    /// `[interpreter]`, `[limits]` and `[policy]` tables
    #[serde(flatten)]
    pub sandbox: SandboxConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub default_timeout_ms: Option<u64>,
    pub interpreter: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            sandbox: SandboxConfig::default(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8000
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `RUNBOX_*` variables as resolved by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(ms) = lookup(ENV_DEFAULT_TIMEOUT_MS) {
            self.sandbox.limits.default_timeout =
                Duration::from_millis(parse_var(ENV_DEFAULT_TIMEOUT_MS, &ms)?);
        }
        if let Some(ms) = lookup(ENV_GRACE_PERIOD_MS) {
            self.sandbox.limits.grace_period =
                Duration::from_millis(parse_var(ENV_GRACE_PERIOD_MS, &ms)?);
        }
        if let Some(ms) = lookup(ENV_MAX_TIMEOUT_MS) {
            self.sandbox.limits.max_timeout =
                Some(Duration::from_millis(parse_var(ENV_MAX_TIMEOUT_MS, &ms)?));
        }
        if let Some(program) = lookup(ENV_INTERPRETER) {
            self.sandbox.interpreter.program = program;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(ms) = overrides.default_timeout_ms {
            self.sandbox.limits.default_timeout = Duration::from_millis(ms);
        }
        if let Some(program) = &overrides.interpreter {
            self.sandbox.interpreter.program = program.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("host must not be empty"));
        }
        self.sandbox.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}: '{}'", name, value))
}
