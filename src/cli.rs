//! Command-Line Host
//!
//! Plays the presentation role around the engine: reads files or stdin,
//! forwards lines to the validator or an [`EditSession`], and renders results.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::{Command, Config};
use crate::language::Language;
use crate::profile::loader::load_configured_profiles;
use crate::profile::ProfileRegistry;
use crate::session::{CommitDecision, EditSession, SessionEvent};
use crate::validation::validate_document;

/// Parse arguments, initialise logging and dispatch the subcommand.
pub async fn run() -> Result<ExitCode> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let registry = load_configured_profiles(&config).await?;

    match config.command.clone() {
        Command::Check { file, json } => check_file(&config, &registry, &file, json).await,
        Command::Session { json } => run_session(&config, registry, json).await,
        Command::Languages => {
            list_languages(&registry);
            Ok(ExitCode::SUCCESS)
        }
        Command::Template { language } => {
            let language = registry.resolve(&language);
            warn_if_unregistered(&registry, &language);
            println!("{}", registry.template_for(&language));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Language for a whole file. Priority: CLI flag > modeline > extension >
/// registry default.
pub fn pick_language(
    config: &Config,
    registry: &ProfileRegistry,
    path: &Path,
    content: &str,
) -> Language {
    if let Some(name) = config.get_effective_language() {
        return registry.resolve(name);
    }
    registry
        .detect_modeline_language(content)
        .or_else(|| registry.language_for_path(path))
        .unwrap_or_else(|| registry.default_language())
}

async fn check_file(
    config: &Config,
    registry: &ProfileRegistry,
    path: &Path,
    json: bool,
) -> Result<ExitCode> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let language = pick_language(config, registry, path, &content);
    warn_if_unregistered(registry, &language);
    log::info!("Checking {} as {}", path.display(), language);

    let diagnostics = validate_document(&content, &language, registry);

    if json {
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "language": language,
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for d in &diagnostics {
            println!("{}:{}: [{}] {}", path.display(), d.line, d.rule, d.message);
        }
    }

    Ok(if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Line-oriented editor: each input line is a commit attempt.
///
/// `:lang NAME` switches language, `:state` prints the session snapshot,
/// `:buffer` prints the buffer, `:quit` ends the session.
async fn run_session(config: &Config, registry: ProfileRegistry, json: bool) -> Result<ExitCode> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = EditSession::new(Arc::new(registry)).with_notifier(tx);
    if let Some(name) = config.get_effective_language() {
        session.switch_language_named(name);
    }
    warn_if_unregistered(session.registry(), session.language());

    // Feedback runs beside the session and never reports back
    let feedback = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Blocked { message } => {
                    log::debug!("blocked: {}", message);
                    eprint!("\x07");
                }
                SessionEvent::Cleared => log::debug!("cleared"),
                SessionEvent::LanguageSwitched { language } => {
                    log::debug!("language switched to {}", language)
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        let trimmed = line.trim();
        if trimmed == ":quit" || trimmed == ":q" {
            break;
        } else if trimmed == ":state" {
            let state = session.current_state();
            if json {
                println!("{}", serde_json::to_string(&state)?);
            } else {
                let status = if state.blocked { "blocked" } else { "clean" };
                println!("{} ({})", state.language, status);
            }
        } else if trimmed == ":buffer" {
            println!("{}", session.content());
        } else if let Some(name) = trimmed.strip_prefix(":lang ") {
            session.switch_language_named(name);
            warn_if_unregistered(session.registry(), session.language());
            println!("language: {}", session.language());
        } else {
            let decision = commit_typed_line(&mut session, &line);
            print_decision(&decision, json)?;
        }
    }

    // Closing the session drops the sender and ends the feedback task
    drop(session);
    let _ = feedback.await;
    Ok(ExitCode::SUCCESS)
}

/// Append `line` to the buffer and commit it at the end. A vetoed line is
/// taken back out so the buffer only ever holds accepted lines.
fn commit_typed_line(session: &mut EditSession, line: &str) -> CommitDecision {
    let before = session.content().to_string();
    let mut content = before.clone();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    session.set_content(content);

    let end = session.content().len();
    let decision = session.attempt_commit_at(end);
    if !decision.allowed {
        session.set_content(before);
    }
    decision
}

fn print_decision(decision: &CommitDecision, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(decision)?);
    } else if let Some(message) = &decision.message {
        println!("{}", message);
    } else {
        println!("ok");
    }
    Ok(())
}

fn list_languages(registry: &ProfileRegistry) {
    for language in registry.languages() {
        let Some(loaded) = registry.get(language) else {
            continue;
        };
        let source = loaded
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{:?}", loaded.priority).to_lowercase());
        println!(
            "{:<12} {:>2} rules  aliases: {:<16} {}",
            language.as_str(),
            loaded.profile.rules().len(),
            loaded.profile.aliases.join(","),
            source
        );
    }
}

fn warn_if_unregistered(registry: &ProfileRegistry, language: &Language) {
    if !registry.contains(language) {
        log::warn!(
            "Language '{}' is not registered; every line will be accepted",
            language
        );
    }
}
