//! Display manager configuration.
//!
//! Settings are read from an optional JSON file. Every field has a default,
//! so a partial file (or no file at all) is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Dots 7 and 8.
pub const DEFAULT_OVERLAY_DOTS: u8 = 0xC0;

/// Tunables for overlays, blinking and shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Dot pattern ORed over cells under a selection.
    pub selection_dots: u8,
    /// Dot pattern ORed over the cell that has focus.
    pub focus_dots: u8,
    /// How long overlays stay visible while blinking.
    pub blink_on_ms: u64,
    /// How long overlays stay hidden while blinking.
    pub blink_off_ms: u64,
    /// Upper bound on the wait for worker tasks during shutdown.
    pub shutdown_timeout_ms: u64,
    /// Cell count of the simulated display.
    pub simulated_cells: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            selection_dots: DEFAULT_OVERLAY_DOTS,
            focus_dots: DEFAULT_OVERLAY_DOTS,
            blink_on_ms: 600,
            blink_off_ms: 800,
            shutdown_timeout_ms: 1000,
            simulated_cells: 40,
        }
    }
}

impl DisplayConfig {
    /// `<config dir>/braille-display/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("braille-display").join("config.json"))
    }

    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded display config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` (or the default path) when it exists, defaults otherwise.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => {
                    debug!("No config directory on this platform, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        if !path.exists() {
            debug!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Rejects settings the manager cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blink_on_ms == 0 {
            return Err(ConfigError::Invalid("blink_on_ms must be > 0".into()));
        }
        if self.blink_off_ms == 0 {
            return Err(ConfigError::Invalid("blink_off_ms must be > 0".into()));
        }
        if self.simulated_cells == 0 {
            return Err(ConfigError::Invalid("simulated_cells must be > 0".into()));
        }
        Ok(())
    }

    pub fn blink_on(&self) -> Duration {
        Duration::from_millis(self.blink_on_ms)
    }

    pub fn blink_off(&self) -> Duration {
        Duration::from_millis(self.blink_off_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
