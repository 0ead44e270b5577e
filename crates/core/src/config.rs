//! Application configuration backed by a TOML file and `TRIVIA__*` env vars.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::models::DEFAULT_CATEGORY;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "trivia";
/// Score at which a round ends.
pub const DEFAULT_WINNING_SCORE: u32 = 10;

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "TRIVIA";

const DEFAULT_CONFIG: &str = r#"# Trivia configuration.
#
# Every key can be overridden with an environment variable, for example
# TRIVIA__WINNING_SCORE=5.

# Path or http(s) URL of the question dataset.
questions_source = "questions.json"

# Category assigned to questions that do not name one.
default_category = "General Knowledge"

# Score that ends the round.
winning_score = 10

# Timeout for fetching a remote dataset.
fetch_timeout_secs = 10
"#;

/// Runtime configuration for the game.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Filesystem path or URL of the question dataset.
    pub questions_source: String,
    /// Fallback label for uncategorised questions.
    pub default_category: String,
    /// Score threshold that ends the round.
    pub winning_score: u32,
    /// Timeout in seconds for remote dataset fetches.
    pub fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_source: "questions.json".to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            winning_score: DEFAULT_WINNING_SCORE,
            fetch_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path`, falling back to defaults for missing keys.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_env(path.as_ref(), None)
    }

    // `env` replaces the process environment when given.
    fn load_with_env(path: &Path, env: Option<::config::Map<String, String>>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.to_path_buf()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Timeout applied to remote dataset requests.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    fn normalized(mut self) -> Self {
        if self.default_category.trim().is_empty() {
            self.default_category = DEFAULT_CATEGORY.to_string();
        }
        if self.winning_score == 0 {
            self.winning_score = DEFAULT_WINNING_SCORE;
        }
        self
    }
}

/// Location of the user's configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Write the default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

/// Write the default configuration to `path` if it does not exist.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::Map;
    use tempfile::tempdir;

    fn load_isolated(path: &Path) -> Result<AppConfig> {
        AppConfig::load_with_env(path, Some(Map::new()))
    }

    #[test]
    fn default_file_matches_default_struct() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let loaded = load_isolated(&path)?;
        assert_eq!(loaded, AppConfig::default());
        Ok(())
    }

    #[test]
    fn existing_file_is_not_overwritten() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "winning_score = 5\n")?;
        ensure_default_config_at(&path)?;

        let loaded = load_isolated(&path)?;
        assert_eq!(loaded.winning_score, 5);
        assert_eq!(loaded.questions_source, "questions.json");
        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let loaded = load_isolated(&dir.path().join("absent.toml"))?;
        assert_eq!(loaded.default_category, DEFAULT_CATEGORY);
        Ok(())
    }

    #[test]
    fn blank_values_fall_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "default_category = \"  \"\nwinning_score = 0\n")?;

        let loaded = load_isolated(&path)?;
        assert_eq!(loaded.default_category, DEFAULT_CATEGORY);
        assert_eq!(loaded.winning_score, DEFAULT_WINNING_SCORE);
        Ok(())
    }

    #[test]
    fn environment_overrides_file_and_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "winning_score = 7\ndefault_category = \"Trivia\"\n")?;

        let mut env = Map::new();
        env.insert("TRIVIA__WINNING_SCORE".to_string(), "5".to_string());
        env.insert("TRIVIA__DEFAULT_CATEGORY".to_string(), "Misc".to_string());
        let loaded = AppConfig::load_with_env(&path, Some(env.clone()))?;
        assert_eq!(loaded.winning_score, 5);
        assert_eq!(loaded.default_category, "Misc");
        assert_eq!(loaded.questions_source, "questions.json");

        let without_file = AppConfig::load_with_env(&dir.path().join("absent.toml"), Some(env))?;
        assert_eq!(without_file.winning_score, 5);
        assert_eq!(without_file.default_category, "Misc");
        Ok(())
    }
}
