//! Validation Engine
//!
//! Clean separation of validation logic from profile loading and sessions.

pub mod engine;

pub use engine::{validate_document, validate_line, Diagnostic, LineValidator};

// Re-export common types
pub use engine::ValidationOutcome;
