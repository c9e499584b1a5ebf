//! Static pre-execution screening of submitted code
//!
//! A line-oriented text scan, not a parse. It runs before any process is
//! spawned and is paired with the process-level controls in
//! [`ProcessRuntime`](crate::ProcessRuntime), which remain the hard boundary.
//!
//! Checks run in a fixed order and the first violation wins:
//! 1. deny-listed module imported (`import X` / `from X import ...`)
//! 2. dynamic evaluation call (`eval(`, `exec(`, `compile(`)
//! 3. line-anchored import of a module outside the allow-list

use crate::error::Result;
use crate::policy::ScreeningPolicy;
use regex::Regex;
use thiserror::Error;

/// Why screening refused a piece of code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Blocked import: {0}")]
    BlockedImport(String),

    #[error("Blocked: eval/exec/compile")]
    DangerousCall,

    #[error("Import not whitelisted: {0}")]
    NotWhitelisted(String),
}

/// Compiled screener for one [`ScreeningPolicy`]
#[derive(Debug, Clone)]
pub struct CodeScreener {
    policy: ScreeningPolicy,
    blocked: Vec<(String, Regex)>,
    dangerous_call: Regex,
    import_statement: Regex,
    module_token: Regex,
}

impl CodeScreener {
    pub fn new(policy: ScreeningPolicy) -> Result<Self> {
        policy.validate()?;

        let blocked = policy
            .blocked_modules
            .iter()
            .map(|name| Ok((name.clone(), blocked_import_pattern(name)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blocked,
            dangerous_call: Regex::new(r"\b(?:eval|exec|compile)\s*\(")?,
            import_statement: Regex::new(
                r"(?m)^[ \t]*(?:from[ \t]+([\w.]+)[ \t]+import\b|import[ \t]+([^\r\n#]+))",
            )?,
            module_token: Regex::new(r"^[\w.]+")?,
            policy,
        })
    }

    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }

    /// Screen `code`, returning the first violation found
    pub fn screen(&self, code: &str) -> Option<Rejection> {
        if let Some((name, _)) = self.blocked.iter().find(|(_, re)| re.is_match(code)) {
            return Some(Rejection::BlockedImport(name.clone()));
        }

        if self.dangerous_call.is_match(code) {
            return Some(Rejection::DangerousCall);
        }

        self.imported_modules(code)
            .find(|module| !self.policy.is_allowed(module))
            .map(|module| Rejection::NotWhitelisted(module.to_string()))
    }

    /// Module names referenced by line-anchored import statements, in
    /// source order
    fn imported_modules<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.import_statement.captures_iter(code).flat_map(move |caps| {
            let names: Vec<&'a str> = match (caps.get(1), caps.get(2)) {
                (Some(from), _) => vec![from.as_str()],
                (None, Some(list)) => list
                    .as_str()
                    .split(',')
                    .filter_map(|item| self.module_token.find(item.trim()))
                    .map(|m| m.as_str())
                    .collect(),
                (None, None) => Vec::new(),
            };
            names
        })
    }
}

/// `import [a, b as c, ...] NAME` or `from NAME[.sub] import`, any case
fn blocked_import_pattern(name: &str) -> Result<Regex> {
    let name = regex::escape(name);
    Ok(Regex::new(&format!(
        r"(?i)\bimport\s+(?:[\w.]+(?:\s+as\s+\w+)?\s*,\s*)*{name}\b|\bfrom\s+{name}\b[\w.]*\s+import\b"
    ))?)
}
