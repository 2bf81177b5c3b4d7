//! Edit Session
//!
//! Owns the state of one open editor: active language, buffer, and whether a
//! commit is currently blocked. State changes only through
//! [`EditSession::switch_language`] and the commit methods; presentation code
//! reads [`EditSession::current_state`] and may listen for [`SessionEvent`]s.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::language::Language;
use crate::profile::ProfileRegistry;
use crate::rules::Rule;
use crate::validation::{LineValidator, ValidationOutcome};

/// Prefix for messages shown while a commit is blocked
pub const BLOCK_NOTICE_PREFIX: &str = "SYNTAX BLOCK: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Clean,
    Blocked,
}

/// Read-only snapshot for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub language: Language,
    pub blocked: bool,
    pub message: Option<String>,
}

/// Answer to a commit attempt: whether the line break may proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDecision {
    pub allowed: bool,
    pub message: Option<String>,
}

/// Fire-and-forget notifications for presentation (status light, banner,
/// shake). Nothing flows back into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Blocked { message: String },
    Cleared,
    LanguageSwitched { language: Language },
}

#[derive(Debug)]
pub struct EditSession {
    registry: Arc<ProfileRegistry>,
    language: Language,
    status: SessionStatus,
    message: Option<String>,
    content: String,
    notifier: Option<UnboundedSender<SessionEvent>>,
}

impl EditSession {
    /// Open a session on the registry's default language with its template
    /// loaded.
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        let language = registry.default_language();
        let content = registry.template_for(&language).to_string();
        Self {
            registry,
            language,
            status: SessionStatus::Clean,
            message: None,
            content,
            notifier: None,
        }
    }

    /// Attach a channel that receives a [`SessionEvent`] after each transition.
    pub fn with_notifier(mut self, notifier: UnboundedSender<SessionEvent>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the buffer after edits made by the host. Does not change the
    /// blocked state.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn current_state(&self) -> SessionState {
        SessionState {
            language: self.language.clone(),
            blocked: self.status == SessionStatus::Blocked,
            message: self.message.clone(),
        }
    }

    /// Register or replace a language profile.
    ///
    /// The registry is shared copy-on-write: other holders of the previous
    /// registry keep seeing it unchanged.
    pub fn register_language(
        &mut self,
        language: Language,
        rules: Vec<Rule>,
        template: impl Into<String>,
    ) {
        Arc::make_mut(&mut self.registry).register(language, rules, template);
    }

    /// Switch language: clears any block and loads the new template.
    ///
    /// Always succeeds; an unregistered language gets an empty buffer and
    /// accepts every line.
    pub fn switch_language(&mut self, language: Language) {
        self.content = self.registry.template_for(&language).to_string();
        self.language = language;
        self.status = SessionStatus::Clean;
        self.message = None;

        log::debug!("Switched session language to {}", self.language);
        self.notify(SessionEvent::LanguageSwitched {
            language: self.language.clone(),
        });
    }

    /// Switch language by user-supplied name or alias
    pub fn switch_language_named(&mut self, name: &str) {
        let language = self.registry.resolve(name);
        self.switch_language(language);
    }

    /// Validate `line` as it is being committed.
    ///
    /// Each attempt is evaluated from scratch; a previous block has no
    /// influence on the outcome.
    pub fn attempt_commit(&mut self, line: &str) -> CommitDecision {
        let outcome = LineValidator::new(&self.registry).validate(line, &self.language);

        match outcome {
            ValidationOutcome::Pass => {
                let was_blocked = self.status == SessionStatus::Blocked;
                self.status = SessionStatus::Clean;
                self.message = None;
                if was_blocked {
                    self.notify(SessionEvent::Cleared);
                }
                CommitDecision {
                    allowed: true,
                    message: None,
                }
            }
            ValidationOutcome::Fail { rule, message } => {
                log::debug!("Commit vetoed by {} rule '{}'", self.language, rule);
                let notice = format!("{BLOCK_NOTICE_PREFIX}{message}");
                self.status = SessionStatus::Blocked;
                self.message = Some(notice.clone());
                self.notify(SessionEvent::Blocked {
                    message: notice.clone(),
                });
                CommitDecision {
                    allowed: false,
                    message: Some(notice),
                }
            }
        }
    }

    /// Commit the buffer line containing byte `offset` (the cursor).
    ///
    /// An offset outside the buffer or inside a multi-byte character is
    /// treated as a blank line and accepted, but nothing is inserted. On an
    /// allowed commit a newline is inserted at the cursor.
    pub fn attempt_commit_at(&mut self, offset: usize) -> CommitDecision {
        let line = match line_at(&self.content, offset) {
            Some(line) => line.to_string(),
            None => {
                log::debug!("No line at offset {}; treating as blank", offset);
                return self.attempt_commit("");
            }
        };

        let decision = self.attempt_commit(&line);
        if decision.allowed {
            self.content.insert(offset, '\n');
        }
        decision
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(tx) = &self.notifier {
            // Receiver may be gone; presentation is best-effort
            let _ = tx.send(event);
        }
    }
}

/// Line of `content` containing byte `offset`, without its terminator.
fn line_at(content: &str, offset: usize) -> Option<&str> {
    if !content.is_char_boundary(offset) {
        return None;
    }
    let start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |i| offset + i);
    Some(&content[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn session() -> EditSession {
        EditSession::new(Arc::new(ProfileRegistry::with_builtin_languages()))
    }

    #[test]
    fn test_line_at() {
        let text = "ab\ncd\n\nef";
        assert_eq!(line_at(text, 0), Some("ab"));
        assert_eq!(line_at(text, 2), Some("ab"));
        assert_eq!(line_at(text, 3), Some("cd"));
        assert_eq!(line_at(text, 6), Some(""));
        assert_eq!(line_at(text, text.len()), Some("ef"));
        assert_eq!(line_at(text, text.len() + 1), None);
        assert_eq!(line_at("é", 1), None);
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        assert_eq!(s.language(), &Language::Java);
        assert_eq!(s.status(), SessionStatus::Clean);
        assert!(s.content().starts_with("public class Main {"));
        assert_eq!(s.current_state().message, None);
    }

    #[test]
    fn test_block_then_clear() {
        let mut s = session();

        let decision = s.attempt_commit("int x = 5");
        assert!(!decision.allowed);
        assert_eq!(
            decision.message.as_deref(),
            Some("SYNTAX BLOCK: Missing semicolon ';' at end of line.")
        );
        assert!(s.current_state().blocked);

        let decision = s.attempt_commit("int x = 5;");
        assert!(decision.allowed);
        assert_eq!(decision.message, None);
        assert_eq!(s.status(), SessionStatus::Clean);
        assert_eq!(s.current_state().message, None);
    }

    #[test]
    fn test_commit_at_cursor_inserts_newline() {
        let mut s = session();
        s.set_content("int x = 5;");
        let decision = s.attempt_commit_at(10);
        assert!(decision.allowed);
        assert_eq!(s.content(), "int x = 5;\n");
    }

    #[test]
    fn test_vetoed_commit_leaves_buffer() {
        let mut s = session();
        s.set_content("int x = 5");
        let decision = s.attempt_commit_at(9);
        assert!(!decision.allowed);
        assert_eq!(s.content(), "int x = 5");
    }

    #[test]
    fn test_malformed_offset_is_blank_line() {
        let mut s = session();
        s.set_content("int x = 5");
        let decision = s.attempt_commit_at(100);
        assert!(decision.allowed);
        assert_eq!(s.content(), "int x = 5");
    }

    #[test]
    fn test_notifications() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut s = session().with_notifier(tx);

        s.attempt_commit("int x = 5;");
        s.attempt_commit("int x = 5");
        s.attempt_commit("int x = 5;");
        s.switch_language(Language::Css);

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Blocked {
                message: "SYNTAX BLOCK: Missing semicolon ';' at end of line.".to_string()
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Cleared);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::LanguageSwitched {
                language: Language::Css
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut s = session().with_notifier(tx);
        assert!(!s.attempt_commit("int x").allowed);
    }
}
