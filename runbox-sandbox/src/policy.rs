//! Screening policy: which modules submitted code may import

use crate::error::{Result, SandboxError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Modules submitted code may import. Everything else is rejected.
pub const DEFAULT_ALLOWED_MODULES: &[&str] = &["json", "re", "math"];

/// Modules rejected outright, checked in this order.
pub const DEFAULT_BLOCKED_MODULES: &[&str] = &[
    "os",
    "subprocess",
    "sys",
    "shutil",
    "socket",
    "urllib",
    "requests",
    "httpx",
    "http",
    "pickle",
    "marshal",
    "ctypes",
    "importlib",
    "multiprocessing",
];

/// Allow/deny lists consulted by the screener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningPolicy {
    /// Modules that may be imported (root package names)
    #[serde(default = "default_allowed_modules")]
    pub allowed_modules: Vec<String>,

    /// Modules that are always rejected, reported in list order
    #[serde(default = "default_blocked_modules")]
    pub blocked_modules: Vec<String>,
}

fn default_allowed_modules() -> Vec<String> {
    DEFAULT_ALLOWED_MODULES.iter().map(|m| m.to_string()).collect()
}

fn default_blocked_modules() -> Vec<String> {
    DEFAULT_BLOCKED_MODULES.iter().map(|m| m.to_string()).collect()
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            allowed_modules: default_allowed_modules(),
            blocked_modules: default_blocked_modules(),
        }
    }
}

impl ScreeningPolicy {
    pub fn new(
        allowed: impl IntoIterator<Item = impl Into<String>>,
        blocked: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            allowed_modules: allowed.into_iter().map(Into::into).collect(),
            blocked_modules: blocked.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a module (by its root package) may be imported
    pub fn is_allowed(&self, module: &str) -> bool {
        let root = module.split('.').next().unwrap_or(module);
        self.allowed_modules.iter().any(|m| m == root)
    }

    /// Reject lists that could make screening ambiguous
    pub fn validate(&self) -> Result<()> {
        for name in self.allowed_modules.iter().chain(&self.blocked_modules) {
            if !is_module_name(name) {
                return Err(SandboxError::Config(format!(
                    "'{}' is not a valid module name",
                    name
                )));
            }
        }

        let blocked: HashSet<String> = self
            .blocked_modules
            .iter()
            .map(|m| m.to_lowercase())
            .collect();
        if let Some(overlap) = self
            .allowed_modules
            .iter()
            .find(|m| blocked.contains(&m.to_lowercase()))
        {
            return Err(SandboxError::Config(format!(
                "module '{}' is both allowed and blocked",
                overlap
            )));
        }

        Ok(())
    }
}

/// Dotted Python identifier, e.g. `os` or `os.path`
fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
