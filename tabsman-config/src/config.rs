//! Core `Config` struct plus load/save and validation.
//!
//! The file lives at `~/.config/tabsman/config.yaml` on every platform except
//! Windows, where the platform config directory is used instead.

use crate::defaults;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // History bounds
    // ========================================================================
    /// Maximum back-stack length, current entry included.
    #[serde(default = "defaults::max_back_stack")]
    pub max_back_stack: usize,

    /// Maximum forward-stack length.
    #[serde(default = "defaults::max_forward_stack")]
    pub max_forward_stack: usize,

    // ========================================================================
    // Persistence
    // ========================================================================
    /// How many closed tabs are remembered, most recent first.
    #[serde(default = "defaults::recently_closed_capacity")]
    pub recently_closed_capacity: usize,

    /// Restore recorded panel scroll offsets when opening a workspace.
    #[serde(default = "defaults::bool_true")]
    pub workspace_scroll_restore: bool,

    // ========================================================================
    // Presentation
    // ========================================================================
    /// Maximum entries listed by a back/forward history menu.
    #[serde(default = "defaults::history_menu_limit")]
    pub history_menu_limit: usize,

    /// Name used when a tab's content cannot be described.
    #[serde(default = "defaults::default_tab_name")]
    pub default_tab_name: String,

    /// Icon used when a tab's content cannot be described.
    #[serde(default = "defaults::default_tab_icon")]
    pub default_tab_icon: String,

    /// Prefix for every user-visible notification.
    #[serde(default = "defaults::notify_prefix")]
    pub notify_prefix: String,

    // ========================================================================
    // Host UI hints
    // ========================================================================
    /// Show the tab sidebar when the host starts.
    ///
    /// Read by the host's UI layer; the engine itself never consults it.
    #[serde(default = "defaults::bool_true")]
    pub default_tab_sidebar: bool,

    /// Expose the "clear persisted data" command.
    #[serde(default = "defaults::bool_false")]
    pub enable_clear_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_back_stack: defaults::max_back_stack(),
            max_forward_stack: defaults::max_forward_stack(),
            recently_closed_capacity: defaults::recently_closed_capacity(),
            workspace_scroll_restore: true,
            history_menu_limit: defaults::history_menu_limit(),
            default_tab_name: defaults::default_tab_name(),
            default_tab_icon: defaults::default_tab_icon(),
            notify_prefix: defaults::notify_prefix(),
            default_tab_sidebar: true,
            enable_clear_data: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file yields the defaults, which are written back so the user
    /// has something to edit. An empty file also yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        log::info!("Config path: {:?}", path);

        if !path.exists() {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self).context("Failed to serialize config")?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)
            .with_context(|| format!("Failed to write config to {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move config into place at {:?}", path))?;

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir()
                .map(|dir| dir.join("tabsman"))
                .unwrap_or_else(|| PathBuf::from("."))
        }
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir()
                .map(|home| home.join(".config").join("tabsman"))
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Check that every bound is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_back_stack == 0 {
            return Err(ConfigError::Validation(
                "max_back_stack must be at least 1 (it holds the current entry)".to_string(),
            ));
        }
        if self.recently_closed_capacity == 0 {
            return Err(ConfigError::Validation(
                "recently_closed_capacity must be at least 1".to_string(),
            ));
        }
        if self.history_menu_limit == 0 {
            return Err(ConfigError::Validation(
                "history_menu_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
