//! Language Identifiers
//!
//! The closed set of languages shipped with the engine plus an open variant
//! for anything registered at runtime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use serde::{Serialize, Serializer};

/// Identifier of a target language.
///
/// Built-in languages have their own variants; any other name is carried in
/// [`Language::Other`] so that unregistered identifiers stay representable and
/// simply validate permissively. Names in [`Language::Other`] compare and
/// hash ASCII case-insensitively, so `"Yaml"` and `"YAML"` are one language.
#[derive(Debug, Clone, Default)]
pub enum Language {
    #[default]
    Java,
    Python,
    JavaScript,
    Html,
    Css,
    Other(String),
}

impl Language {
    /// Built-in languages in their default presentation order.
    pub fn builtin() -> [Language; 5] {
        [
            Language::Java,
            Language::Python,
            Language::JavaScript,
            Language::Html,
            Language::Css,
        ]
    }

    /// Display name of the language.
    pub fn as_str(&self) -> &str {
        match self {
            Language::Java => "Java",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Other(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Language::Other(_))
    }

    /// Map a well-known file extension to a built-in language.
    ///
    /// Extensions of runtime-registered languages are resolved by the
    /// profile registry instead.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "java" => Some(Language::Java),
            "py" | "pyi" => Some(Language::Python),
            "js" | "mjs" | "cjs" => Some(Language::JavaScript),
            "html" | "htm" => Some(Language::Html),
            "css" => Some(Language::Css),
            _ => None,
        }
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Language::Other(a), Language::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for Language {}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        if let Language::Other(name) = self {
            for byte in name.bytes() {
                state.write_u8(byte.to_ascii_lowercase());
            }
        }
    }
}

impl From<&str> for Language {
    /// Built-in names and their short forms match case-insensitively;
    /// everything else becomes [`Language::Other`] verbatim.
    fn from(name: &str) -> Self {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "java" => Language::Java,
            "python" | "py" => Language::Python,
            "javascript" | "js" => Language::JavaScript,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            _ => Language::Other(name.to_string()),
        }
    }
}

impl From<String> for Language {
    fn from(name: String) -> Self {
        Language::from(name.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
