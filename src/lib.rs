//! linestop
//!
//! Live line validation for code editors: each line is checked against the
//! selected language's structural rules when it is committed, and the commit
//! is vetoed if a rule fails.
//!
//! This library provides:
//! - Declarative per-language rules and starter templates
//! - A pure single-line validator
//! - An edit session state machine (clean / blocked)
//! - Profile loading from TOML files and configuration

pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod profile;
pub mod rules;
pub mod session;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use error::ProfileError;
pub use language::Language;
pub use profile::{LanguageProfile, ProfileRegistry};
pub use rules::{Condition, Rule};
pub use session::{CommitDecision, EditSession, SessionEvent, SessionState};
pub use validation::{validate_document, validate_line, LineValidator, ValidationOutcome};
