//! Rule Definition

use super::condition::Condition;

/// A named structural check scoped to one language.
///
/// The rule is violated when its condition matches the line. Rules are pure:
/// the same line always produces the same verdict.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub message: String,
    when: Condition,
}

impl Rule {
    pub fn new(name: impl Into<String>, message: impl Into<String>, when: Condition) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            when,
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.when
    }

    /// Whether `line` breaks this rule
    pub fn is_violated_by(&self, line: &str) -> bool {
        self.when.matches(line)
    }
}
