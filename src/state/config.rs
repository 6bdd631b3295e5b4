/// User configuration
///
/// Step sizes, the debug flag and key bindings. The config is a JSON file in
/// the user's config directory:
/// - Linux: ~/.config/wallcrop/config.json
/// - macOS: ~/Library/Application Support/wallcrop/config.json
/// - Windows: %APPDATA%\wallcrop\config.json
///
/// Every field has a default, so a partial (or missing) file is fine.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SessionError};
use crate::selection::{Steps, DEFAULT_POSITION_STEP, DEFAULT_SIZE_STEP};

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Multiplicative resize step (0.05 = 5% per key press)
    pub size_step: f64,
    /// Move step as a fraction of the image side
    pub position_step: f64,
    /// Verbose logging and geometry traces
    pub debug: bool,
    /// Key bindings
    pub keys: KeyBindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size_step: DEFAULT_SIZE_STEP,
            position_step: DEFAULT_POSITION_STEP,
            debug: false,
            keys: KeyBindings::default(),
        }
    }
}

/// Key bindings, by key name
///
/// Single characters match the typed character ("." or "q"); longer names
/// match named keys ("ArrowUp", "Escape").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KeyBindings {
    pub next: Vec<String>,
    pub previous: Vec<String>,
    pub grow: Vec<String>,
    pub shrink: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub reset: Vec<String>,
    pub toggle_outline: Vec<String>,
    pub save: Vec<String>,
    pub undo: Vec<String>,
    pub help: Vec<String>,
    pub quit: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        // Period and comma share their keys with '>' and '<'.
        // Selection keys sit on the numeric keypad.
        Self {
            next: keys(&["."]),
            previous: keys(&[","]),
            grow: keys(&["+"]),
            shrink: keys(&["-"]),
            up: keys(&["8", "ArrowUp"]),
            down: keys(&["2", "ArrowDown"]),
            left: keys(&["4", "ArrowLeft"]),
            right: keys(&["6", "ArrowRight"]),
            reset: keys(&["0"]),
            toggle_outline: keys(&["5"]),
            save: keys(&["s", "Enter"]),
            undo: keys(&["u"]),
            help: keys(&["h"]),
            quit: keys(&["q", "Escape"]),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("wallcrop");
        path.push("config.json");
        Some(path)
    }

    /// Load from `path`, falling back to defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)
            .map_err(|e| SessionError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that both steps lie strictly between 0 and 1
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("size_step", self.size_step), ("position_step", self.position_step)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SessionError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Step sizes for the selection engine
    pub fn steps(&self) -> Steps {
        Steps {
            size: self.size_step,
            position: self.position_step,
        }
    }
}
