//! Validation Engine
//!
//! Single-line accept/reject decisions, separated from profile loading and
//! session state. Every function here is pure.

use serde::Serialize;

use crate::language::Language;
use crate::profile::ProfileRegistry;
use crate::rules::Rule;

/// Result of validating one line.
///
/// A message exists only on failure, and there is never more than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ValidationOutcome {
    Pass,
    Fail { rule: String, message: String },
}

impl ValidationOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationOutcome::Pass)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Pass => None,
            ValidationOutcome::Fail { message, .. } => Some(message),
        }
    }

    /// Name of the rule that rejected the line
    pub fn rule(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Pass => None,
            ValidationOutcome::Fail { rule, .. } => Some(rule),
        }
    }
}

/// A rejected line within a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    pub rule: String,
    pub message: String,
}

/// Validate a single line against an ordered rule list.
///
/// The line is trimmed first; blank lines always pass. The first violated
/// rule decides the outcome and no further rules are evaluated.
pub fn validate_line(line: &str, rules: &[Rule]) -> ValidationOutcome {
    let line = line.trim();
    if line.is_empty() {
        return ValidationOutcome::Pass;
    }

    rules
        .iter()
        .find(|rule| rule.is_violated_by(line))
        .map_or(ValidationOutcome::Pass, |rule| ValidationOutcome::Fail {
            rule: rule.name.clone(),
            message: rule.message.clone(),
        })
}

/// Validate every line of `content` independently.
///
/// Lines share no state; this is [`validate_line`] applied per line.
pub fn validate_document(
    content: &str,
    language: &Language,
    registry: &ProfileRegistry,
) -> Vec<Diagnostic> {
    let rules = registry.rules_for(language);

    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match validate_line(line, rules) {
            ValidationOutcome::Pass => None,
            ValidationOutcome::Fail { rule, message } => Some(Diagnostic {
                line: idx + 1,
                rule,
                message,
            }),
        })
        .collect()
}

/// Validates lines by language through a profile registry.
#[derive(Debug, Clone, Copy)]
pub struct LineValidator<'a> {
    registry: &'a ProfileRegistry,
}

impl<'a> LineValidator<'a> {
    pub fn new(registry: &'a ProfileRegistry) -> Self {
        Self { registry }
    }

    /// Validate `line` under `language`. Unregistered languages accept
    /// every line.
    pub fn validate(&self, line: &str, language: &Language) -> ValidationOutcome {
        validate_line(line, self.registry.rules_for(language))
    }
}
