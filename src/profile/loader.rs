//! Profile Loading
//!
//! Reads `*.toml` profile files from directories and merges them into a
//! [`ProfileRegistry`]. Loading priority: built-in < user-global < explicit.

use std::path::Path;

use anyhow::Result;

use super::registry::{LoadedProfile, ProfilePriority, ProfileRegistry};
use super::schema::LanguageProfile;
use crate::config::Config;
use crate::error::ProfileError;

/// Build the registry used by the command-line host: embedded profiles
/// first, then every configured directory in increasing priority.
pub async fn load_configured_profiles(config: &Config) -> Result<ProfileRegistry> {
    let mut registry = ProfileRegistry::with_builtin_languages();

    if let Some(dir) = &config.user_language_dir {
        load_profiles_from_directory(dir, ProfilePriority::UserGlobal, &mut registry).await?;
    }
    for dir in &config.language_dirs {
        load_profiles_from_directory(dir, ProfilePriority::Explicit, &mut registry).await?;
    }

    log::info!("Loaded {} language profiles", registry.languages().len());
    Ok(registry)
}

/// Load every `.toml` file in `dir`.
///
/// A missing directory loads nothing. Files that fail to read or parse are
/// logged and skipped. Returns the number of profiles stored.
pub async fn load_profiles_from_directory(
    dir: &Path,
    priority: ProfilePriority,
    registry: &mut ProfileRegistry,
) -> Result<usize, ProfileError> {
    if !dir.exists() {
        return Ok(0);
    }

    let io_err = |source| ProfileError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;

    // Directory order is unspecified; sort so overrides are reproducible
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut stored = 0;
    for path in paths {
        match load_profile_file(&path, priority, registry).await {
            Ok(true) => stored += 1,
            Ok(false) => {
                log::debug!("Skipped {}: higher-priority profile exists", path.display())
            }
            Err(e) => log::warn!("Failed to load profile file {}: {}", path.display(), e),
        }
    }

    Ok(stored)
}

/// Load a single profile file. Returns whether it was stored.
pub async fn load_profile_file(
    path: &Path,
    priority: ProfilePriority,
    registry: &mut ProfileRegistry,
) -> Result<bool, ProfileError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let profile = LanguageProfile::from_toml(&content, &path.display().to_string())?;
    log::info!(
        "Loaded {} profile from {}",
        profile.language,
        path.display()
    );

    Ok(registry.add_loaded(LoadedProfile {
        profile,
        priority,
        source_path: Some(path.to_path_buf()),
    }))
}
