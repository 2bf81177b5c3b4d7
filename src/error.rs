//! Error Types
//!
//! Failures that can happen while building or loading language profiles.
//! Validation itself never fails: a rejected line is a
//! [`ValidationOutcome`](crate::validation::ValidationOutcome), not an error.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    /// A `matches` condition carried a regular expression that does not compile.
    #[error("invalid pattern '{pattern}' in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A profile file is not valid TOML or does not match the schema.
    #[error("failed to parse language profile {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
