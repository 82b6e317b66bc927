//! Startup configuration
//!
//! Read once from a small JSON file. A missing file is created with the
//! defaults; a malformed one aborts startup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Config file name, looked up next to the executable by default
pub const CONFIG_FILE_NAME: &str = "slabd.json";

const DEFAULT_LISTEN_PORT: u16 = 8080;
const DEFAULT_CAPACITY: i64 = 10_000;

/// Daemon settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP port to listen on
    #[serde(rename = "listenPort", alias = "ListenPort")]
    pub listen_port: u16,

    /// Cache capacity in entries. Signed so that a bad value reaches the
    /// cache constructor and is rejected there rather than by the parser.
    pub capacity: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// `slabd.json` in the directory holding the running executable
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Failed to locate executable")?;
        let dir = exe
            .parent()
            .context("Executable path has no parent directory")?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Load the config at `path`, writing a default file first if none exists
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!("No config file found, wrote defaults to {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config JSON; absent fields take their defaults
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid() {
        let cases = [
            ("{}", Config::default()),
            (
                r#"{"ListenPort": 9090}"#,
                Config { listen_port: 9090, ..Config::default() },
            ),
            (
                r#"{"listenPort": 7000, "capacity": 3}"#,
                Config { listen_port: 7000, capacity: 3 },
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(Config::parse(input).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["{", r#"{"listenPort": "8080"}"#, r#"{"listenPort": -1}"#, ""] {
            assert!(Config::parse(input).is_err(), "{}", input);
        }
    }

    #[test]
    fn test_negative_capacity_parses() {
        // Rejected later by the cache constructor
        let config = Config::parse(r#"{"capacity": -5}"#).unwrap();
        assert_eq!(config.capacity, -5);
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let config = Config::load_or_create(&path).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.listen_port, 8080);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"listenPort\": 8080"));
        assert_eq!(Config::load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_existing_file_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"listenPort": 6380, "capacity": 128}"#).unwrap();

        let config = Config::load_or_create(&path).unwrap();

        assert_eq!(config.listen_port, 6380);
        assert_eq!(config.capacity, 128);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{").unwrap();

        let err = Config::load_or_create(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_unwritable_default_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join(CONFIG_FILE_NAME);

        assert!(Config::load_or_create(&path).is_err());
    }
}
