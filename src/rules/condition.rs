//! Line Conditions
//!
//! Small predicate language used by rules. A condition is compiled once when
//! a profile is registered and evaluated against trimmed lines afterwards.

use regex::Regex;

/// Predicate over a single (already trimmed) line of text.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Line contains any of the substrings
    ContainsAny(Vec<String>),
    /// Line starts with any of the prefixes
    StartsWithAny(Vec<String>),
    /// Line ends with any of the suffixes
    EndsWithAny(Vec<String>),
    /// Character occurs an odd number of times
    OddCount(char),
    /// Counts of an opening and closing character differ
    Unbalanced { open: char, close: char },
    Matches(Regex),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn contains_any<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::ContainsAny(needles.into_iter().map(Into::into).collect())
    }

    pub fn starts_with_any<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::StartsWithAny(prefixes.into_iter().map(Into::into).collect())
    }

    pub fn ends_with_any<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::EndsWithAny(suffixes.into_iter().map(Into::into).collect())
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Evaluate the condition. Runs in time linear in the line length for
    /// every variant except `Matches`, whose cost is bounded by the regex.
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Condition::ContainsAny(needles) => needles.iter().any(|n| line.contains(n.as_str())),
            Condition::StartsWithAny(prefixes) => {
                prefixes.iter().any(|p| line.starts_with(p.as_str()))
            }
            Condition::EndsWithAny(suffixes) => suffixes.iter().any(|s| line.ends_with(s.as_str())),
            Condition::OddCount(ch) => count_char(line, *ch) % 2 != 0,
            Condition::Unbalanced { open, close } => {
                count_char(line, *open) != count_char(line, *close)
            }
            Condition::Matches(re) => re.is_match(line),
            Condition::Not(inner) => !inner.matches(line),
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(line)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.matches(line)),
        }
    }
}

fn count_char(line: &str, target: char) -> usize {
    line.chars().filter(|&c| c == target).count()
}
