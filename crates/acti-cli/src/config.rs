//! Configuration loading and management.

use std::path::{Path, PathBuf};

use acti_core::SessionConfig;
use chrono::NaiveTime;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Sampling epoch of the sensor output, in seconds.
    pub window_size_secs: u32,

    /// Clock time of the "not yet reviewed" placeholder window.
    pub default_sleep_time: NaiveTime,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            window_size_secs: session.window_size_secs,
            default_sleep_time: session.default_sleep_time,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ACTI_WINDOW_SIZE_SECS, ACTI_DEFAULT_SLEEP_TIME
        figment = figment.merge(Env::prefixed("ACTI_"));

        figment.extract()
    }

    /// The engine settings carried by this configuration.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            window_size_secs: self.window_size_secs,
            default_sleep_time: self.default_sleep_time,
        }
    }
}

/// Returns the platform-specific config directory for acti.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("acti"))
}
