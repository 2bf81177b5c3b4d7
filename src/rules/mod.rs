//! Rule System
//!
//! Declarative per-line predicates and the messages they emit.

pub mod condition;
pub mod rule;

pub use condition::Condition;
pub use rule::Rule;
