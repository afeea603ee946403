use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ConfigError;

/// Fixed namespace under which the data-source configuration is stored.
pub const STORAGE_KEY: &str = "sentinel_scout_config";

/// Placeholder backend URL used until the user configures one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Where data comes from: the built-in mock dataset or a remote backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredConfiguration", into = "StoredConfiguration")]
pub struct Configuration {
    pub use_remote: bool,
    pub api_base_url: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            use_remote: false,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Configuration {
    pub fn mock() -> Self {
        Self::default()
    }

    pub fn remote(api_base_url: impl Into<String>) -> Self {
        Self {
            use_remote: true,
            api_base_url: api_base_url.into(),
        }
    }
}

/// On-disk shape: `{"useMock": bool, "apiUrl": string}`.
#[derive(Serialize, Deserialize)]
struct StoredConfiguration {
    #[serde(rename = "useMock")]
    use_mock: bool,
    #[serde(rename = "apiUrl")]
    api_url: String,
}

impl From<StoredConfiguration> for Configuration {
    fn from(stored: StoredConfiguration) -> Self {
        Self {
            use_remote: !stored.use_mock,
            api_base_url: stored.api_url,
        }
    }
}

impl From<Configuration> for StoredConfiguration {
    fn from(config: Configuration) -> Self {
        Self {
            use_mock: !config.use_remote,
            api_url: config.api_base_url,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Persists a single [`Configuration`] record as JSON on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store keyed by [`STORAGE_KEY`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }

    /// Return the persisted configuration, or the default when nothing is
    /// stored or the stored record cannot be read.
    pub fn get(&self) -> Configuration {
        match self.load() {
            Ok(Some(cfg)) => cfg,
            Ok(None) => Configuration::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable configuration");
                Configuration::default()
            }
        }
    }

    /// Overwrite the persisted configuration with `config`.
    ///
    /// The record is written to a sibling temp file and renamed into place,
    /// so concurrent readers see either the old or the new record.
    pub fn set(&self, config: &Configuration) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let text =
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| ConfigError::Io(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Return the file path this store reads/writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<Configuration>, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Io(e.to_string())),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Application config directory, falling back to the working directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sentinel-scout")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
