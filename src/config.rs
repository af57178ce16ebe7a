// Configuration: where the server is, which API key to send and where to put
// downloaded reports. Values come from (highest priority first) CLI flags or
// their environment variables, an optional JSON config file, and defaults.

use crate::error::{Result, ScanError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Settings as stored in the config file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileConfig {
    pub server: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `explicit` if given (it must exist), otherwise the default file
    /// if there is one.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/mobsf-cli/config.json`, e.g. `~/.config/mobsf-cli/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mobsf-cli").join("config.json"))
}

/// Values given on the command line (or via environment variables).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub server: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved settings used to build an `ApiClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server: String,
    pub api_key: String,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub output_dir: PathBuf,
}

impl ClientConfig {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let server = overrides
            .server
            .or(file.server)
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let server = server.trim_end_matches('/').to_string();
        if server.is_empty() {
            return Err(ScanError::Config("server URL is empty".into()));
        }

        let api_key = overrides
            .api_key
            .or(file.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ScanError::Config("no API key; pass --api-key or set MOBSF_API_KEY".into())
            })?;

        let timeout = match overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let output_dir = overrides
            .output_dir
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(ClientConfig {
            server,
            api_key,
            timeout,
            output_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = ClientConfig::resolve(
            Overrides {
                api_key: Some("key".into()),
                ..Default::default()
            },
            FileConfig::default(),
        )
        .unwrap();
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.timeout, Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileConfig {
            server: Some("http://file:8000".into()),
            api_key: Some("file-key".into()),
            timeout_secs: Some(10),
            output_dir: Some(PathBuf::from("/tmp/reports")),
        };
        let overrides = Overrides {
            server: Some("http://cli:9000/".into()),
            ..Default::default()
        };
        let config = ClientConfig::resolve(overrides, file).unwrap();
        assert_eq!(config.server, "http://cli:9000");
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let overrides = Overrides {
            api_key: Some("key".into()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        let config = ClientConfig::resolve(overrides, FileConfig::default()).unwrap();
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = ClientConfig::resolve(Overrides::default(), FileConfig::default());
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn test_load_file_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"server": "http://10.0.0.2:8000", "timeout_secs": 60}"#).unwrap();

        let file = FileConfig::discover(Some(&path)).unwrap();
        assert_eq!(file.server.as_deref(), Some("http://10.0.0.2:8000"));
        assert_eq!(file.timeout_secs, Some(60));
        assert!(file.api_key.is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileConfig::discover(Some(&dir.path().join("nope.json")));
        assert!(matches!(result, Err(ScanError::Io { .. })));
    }
}
