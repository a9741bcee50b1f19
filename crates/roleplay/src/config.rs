//! Configuration types for role-play projects.
//!
//! All types implement [`serde::Deserialize`] and default every missing
//! field, so a partial (or empty) TOML file is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`PlayerConfig`] - Playback settings.
//! - [`StorageConfig`] - How projects are written to disk.
//! - [`ValidationConfig`] - How strictly projects are checked.
//!
//! # Example
//!
//! ```
//! # use roleplay::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.player().history_label_length(), 30);
//! assert_eq!(config.storage().media_dir(), "media");
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Player section.
    #[serde(default)]
    player: PlayerConfig,

    /// Storage section.
    #[serde(default)]
    storage: StorageConfig,

    /// Validation section.
    #[serde(default)]
    validation: ValidationConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        player: PlayerConfig,
        storage: StorageConfig,
        validation: ValidationConfig,
    ) -> Self {
        Self {
            player,
            storage,
            validation,
        }
    }

    pub fn player(&self) -> &PlayerConfig {
        &self.player
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }
}

/// Playback settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Maximum number of glyphs in a history entry label, ellipsis included.
    #[serde(default = "default_history_label_length")]
    history_label_length: usize,
}

fn default_history_label_length() -> usize {
    30
}

impl PlayerConfig {
    /// Creates a player configuration.
    ///
    /// A label length of zero is raised to one.
    pub fn new(history_label_length: usize) -> Self {
        Self {
            history_label_length: history_label_length.max(1),
        }
    }

    pub fn history_label_length(&self) -> usize {
        self.history_label_length.max(1)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new(default_history_label_length())
    }
}

/// How projects are written to disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Pretty-print `project.json`.
    #[serde(default = "default_pretty")]
    pretty: bool,

    /// Directory, relative to the bundle root, that holds media files.
    #[serde(default = "default_media_dir")]
    media_dir: String,
}

fn default_pretty() -> bool {
    true
}

fn default_media_dir() -> String {
    "media".to_string()
}

impl StorageConfig {
    pub fn new(pretty: bool, media_dir: impl Into<String>) -> Self {
        Self {
            pretty,
            media_dir: media_dir.into(),
        }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn media_dir(&self) -> &str {
        &self.media_dir
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(default_pretty(), default_media_dir())
    }
}

/// How strictly projects are checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    /// Treat warnings as failures in `check`.
    #[serde(default)]
    deny_warnings: bool,
}

impl ValidationConfig {
    pub fn new(deny_warnings: bool) -> Self {
        Self { deny_warnings }
    }

    pub fn deny_warnings(&self) -> bool {
        self.deny_warnings
    }
}
