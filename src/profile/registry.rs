//! Profile Registry
//!
//! In-memory catalog mapping languages to their profiles. Lookups never fail:
//! an unregistered language gets a permissive profile with no rules and an
//! empty template.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::schema::LanguageProfile;
use crate::language::Language;
use crate::rules::Rule;

/// Profiles compiled into the binary, in default presentation order.
const EMBEDDED_PROFILES: [(&str, &str); 5] = [
    (
        "java.lang.toml",
        include_str!("../../resources/languages/java.lang.toml"),
    ),
    (
        "python.lang.toml",
        include_str!("../../resources/languages/python.lang.toml"),
    ),
    (
        "javascript.lang.toml",
        include_str!("../../resources/languages/javascript.lang.toml"),
    ),
    (
        "html.lang.toml",
        include_str!("../../resources/languages/html.lang.toml"),
    ),
    (
        "css.lang.toml",
        include_str!("../../resources/languages/css.lang.toml"),
    ),
];

static MODELINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"linestop:\s*language\s*=\s*([\w.#+-]+)").expect("modeline pattern is valid")
});

/// Where a profile came from. Later sources override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfilePriority {
    BuiltIn = 0,
    UserGlobal = 1,
    Explicit = 2,
    Runtime = 3,
}

/// A registered profile with its source and priority
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub profile: LanguageProfile,
    pub priority: ProfilePriority,
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<Language, LoadedProfile>,
    /// Lower-cased names and aliases
    names: HashMap<String, Language>,
    extensions: HashMap<String, Language>,
    /// First-registration order; the first entry is the default language
    order: Vec<Language>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the embedded Java, Python, JavaScript,
    /// HTML and CSS profiles.
    pub fn with_builtin_languages() -> Self {
        let mut registry = Self::new();
        registry.add_embedded_profiles();
        registry
    }

    /// Add the profiles compiled into the binary at [`ProfilePriority::BuiltIn`].
    pub fn add_embedded_profiles(&mut self) {
        for (file_name, content) in EMBEDDED_PROFILES {
            match LanguageProfile::from_toml(content, file_name) {
                Ok(profile) => {
                    self.add_loaded(LoadedProfile {
                        profile,
                        priority: ProfilePriority::BuiltIn,
                        source_path: None,
                    });
                }
                Err(e) => {
                    log::error!("Failed to load embedded profile {}: {}", file_name, e);
                }
            }
        }
    }

    /// Register a language, replacing any existing profile wholesale.
    pub fn register(&mut self, language: Language, rules: Vec<Rule>, template: impl Into<String>) {
        self.register_profile(LanguageProfile::new(language, rules, template));
    }

    /// Register a fully built profile, replacing any existing one.
    pub fn register_profile(&mut self, profile: LanguageProfile) {
        self.insert(LoadedProfile {
            profile,
            priority: ProfilePriority::Runtime,
            source_path: None,
        });
    }

    /// Add a profile unless one of higher priority is already registered.
    ///
    /// Returns whether the profile was stored.
    pub fn add_loaded(&mut self, loaded: LoadedProfile) -> bool {
        let should_load = match self.profiles.get(&loaded.profile.language) {
            Some(existing) => loaded.priority >= existing.priority,
            None => true,
        };

        if should_load {
            self.insert(loaded);
        }
        should_load
    }

    fn insert(&mut self, loaded: LoadedProfile) {
        let language = loaded.profile.language.clone();

        // Drop lookups left over from a previous profile of this language
        self.names.retain(|_, l| *l != language);
        self.extensions.retain(|_, l| *l != language);

        self.names
            .insert(language.as_str().to_ascii_lowercase(), language.clone());
        for alias in &loaded.profile.aliases {
            self.names
                .insert(alias.to_ascii_lowercase(), language.clone());
        }
        for ext in &loaded.profile.extensions {
            self.extensions
                .insert(ext.trim_start_matches('.').to_ascii_lowercase(), language.clone());
        }

        if !self.order.contains(&language) {
            self.order.push(language.clone());
        }

        log::debug!(
            "Registered {} ({} rules, {:?})",
            language,
            loaded.profile.rules().len(),
            loaded.priority
        );
        self.profiles.insert(language, loaded);
    }

    /// Ordered rules for `language`; empty for unregistered languages.
    pub fn rules_for(&self, language: &Language) -> &[Rule] {
        self.profiles
            .get(language)
            .map(|loaded| loaded.profile.rules())
            .unwrap_or(&[])
    }

    /// Profile for `language`, or a permissive one if it is not registered.
    pub fn profile_for(&self, language: &Language) -> Cow<'_, LanguageProfile> {
        match self.profiles.get(language) {
            Some(loaded) => Cow::Borrowed(&loaded.profile),
            None => Cow::Owned(LanguageProfile::permissive(language.clone())),
        }
    }

    /// Starter code for `language`; empty for unregistered languages.
    pub fn template_for(&self, language: &Language) -> &str {
        self.profiles
            .get(language)
            .map(|loaded| loaded.profile.template())
            .unwrap_or("")
    }

    pub fn get(&self, language: &Language) -> Option<&LoadedProfile> {
        self.profiles.get(language)
    }

    pub fn contains(&self, language: &Language) -> bool {
        self.profiles.contains_key(language)
    }

    /// Registered languages in first-registration order
    pub fn languages(&self) -> &[Language] {
        &self.order
    }

    /// First registered language, the one a new session opens with.
    pub fn default_language(&self) -> Language {
        self.order.first().cloned().unwrap_or_default()
    }

    /// Resolve a user-supplied name through registered names and aliases,
    /// case-insensitively. Unknown names still produce a [`Language`].
    pub fn resolve(&self, name: &str) -> Language {
        self.names
            .get(&name.trim().to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| Language::from(name))
    }

    /// Language registered for the extension of `path`, falling back to the
    /// built-in extension table.
    pub fn language_for_path(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extensions
            .get(&ext)
            .cloned()
            .or_else(|| Language::from_extension(&ext))
    }

    /// Detect a language from a modeline such as `// linestop: language=python`.
    ///
    /// Only the first and last five lines are inspected.
    pub fn detect_modeline_language(&self, content: &str) -> Option<Language> {
        let lines: Vec<&str> = content.lines().collect();
        let check_lines: Vec<&str> = if lines.len() <= 10 {
            lines
        } else {
            let mut check = Vec::new();
            check.extend_from_slice(&lines[0..5]);
            check.extend_from_slice(&lines[lines.len() - 5..]);
            check
        };

        check_lines.into_iter().find_map(|line| {
            let captures = MODELINE_RE.captures(line)?;
            Some(self.resolve(captures.get(1)?.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Condition;

    fn semicolon_rule() -> Rule {
        Rule::new(
            "semicolon",
            "needs ;",
            Condition::ends_with_any([";"]).negate(),
        )
    }

    #[test]
    fn test_registry_creation() {
        let registry = ProfileRegistry::new();
        assert!(registry.languages().is_empty());
        assert_eq!(registry.default_language(), Language::Java);
    }

    #[test]
    fn test_embedded_profiles_all_parse() {
        let registry = ProfileRegistry::with_builtin_languages();
        assert_eq!(registry.languages(), &Language::builtin());
        for language in Language::builtin() {
            assert!(!registry.rules_for(&language).is_empty(), "{language}");
            assert!(!registry.template_for(&language).is_empty(), "{language}");
        }
    }

    #[test]
    fn test_rule_order_is_registration_order() {
        let registry = ProfileRegistry::with_builtin_languages();
        let names: Vec<&str> = registry
            .rules_for(&Language::Java)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "structure-terminator",
                "balanced-parentheses",
                "statement-terminator"
            ]
        );
    }

    #[test]
    fn test_unknown_language_is_permissive() {
        let registry = ProfileRegistry::with_builtin_languages();
        let rust = Language::from("Rust");

        assert!(registry.rules_for(&rust).is_empty());
        assert_eq!(registry.template_for(&rust), "");
        let profile = registry.profile_for(&rust);
        assert!(matches!(profile, Cow::Owned(_)));
        assert_eq!(profile.language, rust);
    }

    #[test]
    fn test_register_replaces_wholesale() {
        let mut registry = ProfileRegistry::with_builtin_languages();
        registry.register(Language::Java, vec![semicolon_rule()], "class A {}");

        assert_eq!(registry.rules_for(&Language::Java).len(), 1);
        assert_eq!(registry.template_for(&Language::Java), "class A {}");
        assert_eq!(
            registry.get(&Language::Java).unwrap().priority,
            ProfilePriority::Runtime
        );
        // Position in the language list is kept
        assert_eq!(registry.default_language(), Language::Java);
        assert_eq!(registry.languages().len(), 5);
    }

    #[test]
    fn test_replacement_drops_stale_extensions() {
        let mut registry = ProfileRegistry::new();
        let mut first = LanguageProfile::new(Language::from("Shell"), vec![], "");
        first.extensions = vec!["sh".to_string(), "bash".to_string()];
        registry.register_profile(first);

        let mut second = LanguageProfile::new(Language::from("Shell"), vec![], "");
        second.extensions = vec!["sh".to_string()];
        registry.register_profile(second);

        assert_eq!(registry.language_for_path(Path::new("x.bash")), None);
        assert_eq!(
            registry.language_for_path(Path::new("x.sh")),
            Some(Language::from("Shell"))
        );
    }

    #[test]
    fn test_lower_priority_does_not_override() {
        let mut registry = ProfileRegistry::new();
        registry.register(Language::Css, vec![semicolon_rule()], "runtime");

        let stored = registry.add_loaded(LoadedProfile {
            profile: LanguageProfile::new(Language::Css, vec![], "builtin"),
            priority: ProfilePriority::BuiltIn,
            source_path: None,
        });

        assert!(!stored);
        assert_eq!(registry.template_for(&Language::Css), "runtime");
    }

    #[test]
    fn test_runtime_language_keeps_priority_across_name_case() {
        let mut registry = ProfileRegistry::new();
        registry.register(Language::from("Yaml"), vec![semicolon_rule()], "runtime");

        let stored = registry.add_loaded(LoadedProfile {
            profile: LanguageProfile::new(Language::from("YAML"), vec![], "explicit"),
            priority: ProfilePriority::Explicit,
            source_path: None,
        });

        assert!(!stored);
        assert_eq!(registry.languages().len(), 1);
        assert_eq!(registry.rules_for(&Language::from("yaml")).len(), 1);
        let resolved = registry.resolve("yaml");
        assert_eq!(registry.template_for(&resolved), "runtime");
    }

    #[test]
    fn test_resolve_aliases() {
        let registry = ProfileRegistry::with_builtin_languages();
        assert_eq!(registry.resolve("js"), Language::JavaScript);
        assert_eq!(registry.resolve("Py"), Language::Python);
        assert_eq!(registry.resolve("HTM"), Language::Html);
        assert_eq!(registry.resolve("Go"), Language::Other("Go".to_string()));
    }

    #[test]
    fn test_language_for_path() {
        let mut registry = ProfileRegistry::with_builtin_languages();
        let mut shell = LanguageProfile::new(Language::from("Shell"), vec![], "");
        shell.extensions = vec!["sh".to_string()];
        registry.register_profile(shell);

        assert_eq!(
            registry.language_for_path(Path::new("src/Main.java")),
            Some(Language::Java)
        );
        assert_eq!(
            registry.language_for_path(Path::new("run.sh")),
            Some(Language::from("Shell"))
        );
        assert_eq!(registry.language_for_path(Path::new("README")), None);
    }

    #[test]
    fn test_detect_modeline_language() {
        let registry = ProfileRegistry::with_builtin_languages();

        let content = "# linestop: language=py\nif x:\n    pass";
        assert_eq!(
            registry.detect_modeline_language(content),
            Some(Language::Python)
        );

        let content = "<!-- linestop: language = html -->\n<div>";
        assert_eq!(
            registry.detect_modeline_language(content),
            Some(Language::Html)
        );

        assert_eq!(registry.detect_modeline_language("int x = 5;"), None);
    }

    #[test]
    fn test_modeline_only_checked_near_edges() {
        let registry = ProfileRegistry::with_builtin_languages();
        let mut lines = vec!["x;"; 20];
        lines[10] = "// linestop: language=css";
        assert_eq!(registry.detect_modeline_language(&lines.join("\n")), None);

        lines[18] = "// linestop: language=css";
        assert_eq!(
            registry.detect_modeline_language(&lines.join("\n")),
            Some(Language::Css)
        );
    }
}
