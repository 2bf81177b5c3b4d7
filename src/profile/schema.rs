//! Profile Schema Types
//!
//! File-level types matching the `*.lang.toml` layout, and the runtime
//! [`LanguageProfile`] they compile into.

use regex::Regex;
use serde::Deserialize;

use crate::error::ProfileError;
use crate::language::Language;
use crate::rules::{Condition, Rule};

/// Root profile file structure (matches TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageFile {
    pub language: LanguageMeta,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// Profile metadata
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageMeta {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub template: String,
}

/// Rule as written in a profile file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub name: String,
    pub message: String,
    pub when: ConditionDef,
}

/// Condition as written in a profile file, e.g. `{ ends_with_any = [";"] }`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionDef {
    ContainsAny(Vec<String>),
    StartsWithAny(Vec<String>),
    EndsWithAny(Vec<String>),
    OddCount(char),
    Unbalanced { open: char, close: char },
    Matches(String),
    Not(Box<ConditionDef>),
    All(Vec<ConditionDef>),
    Any(Vec<ConditionDef>),
}

/// Runtime profile: an ordered rule list and a starter template.
///
/// Rule order is evaluation order and is fixed once the profile is built.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub language: Language,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub extensions: Vec<String>,
    rules: Vec<Rule>,
    template: String,
}

impl LanguageProfile {
    pub fn new(language: Language, rules: Vec<Rule>, template: impl Into<String>) -> Self {
        Self {
            language,
            description: None,
            aliases: Vec::new(),
            extensions: Vec::new(),
            rules,
            template: template.into(),
        }
    }

    /// Profile with no rules and an empty template; accepts every line.
    pub fn permissive(language: Language) -> Self {
        Self::new(language, Vec::new(), String::new())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parse and compile a profile from TOML text.
    ///
    /// `origin` names the source in error messages (a path or "built-in").
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ProfileError> {
        let file: LanguageFile = toml::from_str(content).map_err(|source| ProfileError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Self::try_from(file)
    }
}

impl TryFrom<LanguageFile> for LanguageProfile {
    type Error = ProfileError;

    fn try_from(file: LanguageFile) -> Result<Self, Self::Error> {
        let rules = file
            .rules
            .into_iter()
            .map(|def| {
                let when = compile_condition(def.when, &def.name)?;
                Ok(Rule::new(def.name, def.message, when))
            })
            .collect::<Result<Vec<_>, ProfileError>>()?;

        Ok(Self {
            language: Language::from(file.language.name),
            description: file.language.description,
            aliases: file.language.aliases,
            extensions: file.language.extensions,
            rules,
            template: file.language.template,
        })
    }
}

/// Compile a condition definition, building any regexes up front.
fn compile_condition(def: ConditionDef, rule: &str) -> Result<Condition, ProfileError> {
    let condition = match def {
        ConditionDef::ContainsAny(v) => Condition::ContainsAny(v),
        ConditionDef::StartsWithAny(v) => Condition::StartsWithAny(v),
        ConditionDef::EndsWithAny(v) => Condition::EndsWithAny(v),
        ConditionDef::OddCount(ch) => Condition::OddCount(ch),
        ConditionDef::Unbalanced { open, close } => Condition::Unbalanced { open, close },
        ConditionDef::Matches(pattern) => {
            let re = Regex::new(&pattern).map_err(|source| ProfileError::InvalidPattern {
                rule: rule.to_string(),
                pattern,
                source,
            })?;
            Condition::Matches(re)
        }
        ConditionDef::Not(inner) => compile_condition(*inner, rule)?.negate(),
        ConditionDef::All(defs) => Condition::All(compile_all(defs, rule)?),
        ConditionDef::Any(defs) => Condition::Any(compile_all(defs, rule)?),
    };
    Ok(condition)
}

fn compile_all(defs: Vec<ConditionDef>, rule: &str) -> Result<Vec<Condition>, ProfileError> {
    defs.into_iter()
        .map(|d| compile_condition(d, rule))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[language]
name = "Shell"
aliases = ["sh"]
extensions = ["sh"]
template = "set -e"

[[rules]]
name = "no-trailing-space"
message = "Trailing whitespace"
when = { matches = '\s+$' }

[[rules]]
name = "quote-balance"
message = "Unclosed quote"
when = { any = [ { odd_count = '"' }, { odd_count = "'" } ] }
"#;

    #[test]
    fn test_condition_def_shapes() {
        let def: ConditionDef = toml::from_str::<RuleDef>(
            r#"
name = "x"
message = "y"
when = { not = { unbalanced = { open = "(", close = ")" } } }
"#,
        )
        .unwrap()
        .when;
        assert_eq!(
            def,
            ConditionDef::Not(Box::new(ConditionDef::Unbalanced {
                open: '(',
                close: ')'
            }))
        );
    }

    #[test]
    fn test_profile_from_toml() {
        let profile = LanguageProfile::from_toml(SAMPLE, "test").unwrap();

        assert_eq!(profile.language, Language::Other("Shell".to_string()));
        assert_eq!(profile.aliases, vec!["sh".to_string()]);
        assert_eq!(profile.template(), "set -e");
        let names: Vec<&str> = profile.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["no-trailing-space", "quote-balance"]);
        assert!(profile.rules()[0].is_violated_by("echo hi "));
        assert!(profile.rules()[1].is_violated_by("echo 'hi"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let content = r#"
[language]
name = "Broken"

[[rules]]
name = "bad-regex"
message = "never shown"
when = { matches = "(unclosed" }
"#;
        let err = LanguageProfile::from_toml(content, "test").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidPattern { ref rule, .. } if rule == "bad-regex"));
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = LanguageProfile::from_toml("[language", "broken.lang.toml").unwrap_err();
        assert!(err.to_string().contains("broken.lang.toml"));
    }

    #[test]
    fn test_rules_are_optional() {
        let profile =
            LanguageProfile::from_toml("[language]\nname = \"Plain\"\n", "test").unwrap();
        assert!(profile.rules().is_empty());
        assert_eq!(profile.template(), "");
    }
}
