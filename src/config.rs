//! Runtime configuration.
//!
//! Values resolve as: command line > environment > config file > defaults.
//! File loading needs the `config` cargo feature.

use crate::error::{Result, TermscrollError};
use crate::export::ExportConfig;
use crate::theme::Theme;
use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

fn default_max_lines() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_export_title() -> String {
    ExportConfig::default().title
}

/// Scrollback console settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub struct Config {
    /// Lines kept before the oldest is evicted
    #[cfg_attr(feature = "config", serde(default = "default_max_lines"))]
    pub max_lines: usize,

    #[cfg_attr(feature = "config", serde(default = "default_true"))]
    pub status_bar: bool,

    /// Name of a built-in theme
    #[cfg_attr(feature = "config", serde(default = "default_theme"))]
    pub theme: String,

    /// Title written into Markdown and HTML exports
    #[cfg_attr(feature = "config", serde(default = "default_export_title"))]
    pub export_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            status_bar: default_true(),
            theme: default_theme(),
            export_title: default_export_title(),
        }
    }
}

impl Config {
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn with_status_bar(mut self, enabled: bool) -> Self {
        self.status_bar = enabled;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_export_title(mut self, title: impl Into<String>) -> Self {
        self.export_title = title.into();
        self
    }

    /// Override fields from `TERMSCROLL_MAX_LINES` and `TERMSCROLL_THEME`
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(val) = env::var("TERMSCROLL_MAX_LINES") {
            match val.parse() {
                Ok(lines) => self.max_lines = lines,
                Err(_) => log::warn!("ignoring TERMSCROLL_MAX_LINES={}", val),
            }
        }
        if let Ok(val) = env::var("TERMSCROLL_THEME") {
            self.theme = val;
        }
    }

    /// Check value ranges and names
    ///
    /// # Errors
    /// * `Config` if `max_lines` is zero or the theme is unknown
    pub fn validate(&self) -> Result<()> {
        if self.max_lines == 0 {
            return Err(TermscrollError::config("max-lines must be at least 1"));
        }
        Theme::from_name(&self.theme)?;
        Ok(())
    }

    /// Export settings derived from this configuration
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            title: self.export_title.clone(),
        }
    }
}

#[cfg(feature = "config")]
impl Config {
    /// Parse TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TermscrollError::config(format!("Failed to parse config: {}", e)))
    }

    /// Load and validate a configuration file
    ///
    /// # Errors
    /// * `Io` if the file cannot be read
    /// * `Config` if it does not parse or validate
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TermscrollError::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/termscroll/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("termscroll").join("config.toml"))
    }

    /// Load the default config file if present, otherwise defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::debug!("loading config from {}", path.display());
                Self::load_from(path)
            }
            _ => Ok(Self::default()),
        }
    }
}
