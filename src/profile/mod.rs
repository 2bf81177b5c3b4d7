//! Language Profiles
//!
//! Ordered rule lists and starter templates, keyed by language.

pub mod loader;
pub mod registry;
pub mod schema;

pub use registry::{LoadedProfile, ProfilePriority, ProfileRegistry};
pub use schema::{ConditionDef, LanguageFile, LanguageProfile, RuleDef};
