pub mod chat;
pub mod config;
pub mod data;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scout_core::config::RuntimeSettings;
use scout_core::settings::{default_config_dir, ConfigStore};
use scout_data::{ClientOptions, DataClient, DataError};
use scout_telemetry::LogFormat;
use serde::Serialize;

/// Everything a command needs: where settings live, the runtime settings,
/// and a data client built from the stored configuration.
pub struct Context {
    pub store: ConfigStore,
    pub settings: RuntimeSettings,
    pub client: Arc<DataClient>,
    pub json: bool,
}

impl Context {
    /// Resolve the config directory, start logging, and build the client.
    pub fn load(config_dir: Option<PathBuf>, json: bool) -> Self {
        let dir = config_dir.unwrap_or_else(default_config_dir);
        let (settings, settings_error) = load_settings(&dir.join("scout.toml"));

        scout_telemetry::init(
            "scout",
            &settings.general.log_level,
            LogFormat::from_json_flag(settings.general.log_json),
        );
        if let Some(e) = settings_error {
            tracing::warn!(error = %e, "ignoring invalid scout.toml, using defaults");
        }

        Self::new(ConfigStore::in_dir(&dir), settings, json)
    }

    pub fn new(store: ConfigStore, settings: RuntimeSettings, json: bool) -> Self {
        let client = DataClient::new(&store.get(), ClientOptions::from(&settings.client));
        Self {
            store,
            settings,
            client: Arc::new(client),
            json,
        }
    }
}

/// Settings are read before logging exists, so a load failure is handed
/// back to be reported once the subscriber is installed.
fn load_settings(path: &Path) -> (RuntimeSettings, Option<String>) {
    if !path.exists() {
        return (RuntimeSettings::default(), None);
    }
    match RuntimeSettings::load_from(path) {
        Ok(settings) => (settings, None),
        Err(e) => (RuntimeSettings::default(), Some(e.to_string())),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Add a hint for the failure users hit most: a backend that is not running.
pub fn friendly_error(err: DataError) -> anyhow::Error {
    if err.is_connectivity() {
        anyhow::anyhow!(
            "{err}\n  (hint: start the backend, check the URL with `scout config test`, \
             or switch to mock data with `scout config set --mock`)"
        )
    } else {
        anyhow::Error::new(err)
    }
}
