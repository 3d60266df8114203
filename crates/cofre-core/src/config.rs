//! Application settings
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (`~/.local/share/cofre/config/cofre.toml`)
//! 2. The embedded defaults compiled into the binary
//!
//! Keys missing from an override keep their default value.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fire::FireParameters;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/cofre.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    /// Lifetime of cached analytics snapshots
    pub cache_ttl: Duration,
    /// Defaults for FIRE parameters the caller leaves out
    pub fire: FireParameters,
    /// None when the recurring scheduler is disabled
    pub recurring_interval: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            cache_ttl: Duration::from_secs(60),
            fire: FireParameters::default(),
            recurring_interval: Some(Duration::from_secs(3600)),
        }
    }
}

impl Settings {
    /// Load settings (explicit path, then data dir override, then defaults)
    ///
    /// An explicit path that does not exist is an error; a missing data dir
    /// override is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Using config override");
                    fs::read_to_string(&path)?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Parse TOML content on top of the embedded defaults
    pub fn parse(content: &str) -> Result<Self> {
        let mut settings = Self::defaults()?;
        let raw: RawConfig = toml::from_str(content)?;
        settings.apply(raw)?;
        Ok(settings)
    }

    /// The embedded defaults alone
    pub fn defaults() -> Result<Self> {
        let mut settings = Self::default();
        let raw: RawConfig = toml::from_str(DEFAULT_CONFIG)?;
        settings.apply(raw)?;
        Ok(settings)
    }

    fn apply(&mut self, raw: RawConfig) -> Result<()> {
        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(ttl) = raw.cache.and_then(|c| c.ttl_secs) {
            self.cache_ttl = Duration::from_secs(ttl);
        }

        if let Some(fire) = raw.fire {
            if let Some(expected_return) = fire.expected_return {
                self.fire.expected_return = expected_return;
            }
            if let Some(withdrawal_rate) = fire.withdrawal_rate {
                if withdrawal_rate <= 0.0 {
                    return Err(Error::Config(format!(
                        "fire.withdrawal_rate must be positive, got {}",
                        withdrawal_rate
                    )));
                }
                self.fire.withdrawal_rate = withdrawal_rate;
            }
            if let Some(age) = fire.current_age {
                self.fire.current_age = age;
            }
        }

        if let Some(mins) = raw.scheduler.and_then(|s| s.recurring_interval_mins) {
            self.recurring_interval = match mins {
                0 => None,
                m => Some(Duration::from_secs(m * 60)),
            };
        }

        Ok(())
    }

    /// "host:port" for binding the server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Default override location in the platform data dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cofre").join("config").join("cofre.toml"))
}

/// Default database location in the platform data dir
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cofre").join("cofre.db"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    server: Option<RawServer>,
    cache: Option<RawCache>,
    fire: Option<RawFire>,
    scheduler: Option<RawScheduler>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawFire {
    expected_return: Option<f64>,
    withdrawal_rate: Option<f64>,
    current_age: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawScheduler {
    recurring_interval_mins: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_parse() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.fire.withdrawal_rate, 4.0);
        assert_eq!(settings.recurring_interval, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let settings = Settings::parse(
            r#"
            [server]
            port = 8080

            [scheduler]
            recurring_interval_mins = 0
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.recurring_interval, None);
        assert_eq!(settings.fire.expected_return, 7.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Settings::parse("[fire]\nwithdrawal_rate = 0.0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::parse("[server]\nport = \"eighty\"\n"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 5").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.cache_ttl, Duration::from_secs(5));
        assert_eq!(settings.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
