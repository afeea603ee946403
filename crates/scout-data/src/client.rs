use std::sync::{Arc, RwLock};
use std::time::Duration;

use scout_core::config::ClientConfig;
use scout_core::settings::Configuration;
use scout_core::types::{
    DashboardStats, Finding, ReportLink, Run, ScanTicket, TrendPoint,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DataError, Operation};
use crate::mock::{Latency, MockSource};
use crate::remote::RemoteSource;
use crate::source::{DataSource, SourceKind};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Construction parameters that do not come from the persisted
/// [`Configuration`].
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub latency: Latency,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            latency: Latency::standard(),
        }
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            request_timeout: cfg.request_timeout(),
            latency: if cfg.simulate_latency {
                Latency::standard()
            } else {
                Latency::none()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Everything the dashboard view needs, fetched in one go.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub findings: Vec<Finding>,
    pub trend: Vec<TrendPoint>,
    pub runs: Vec<Run>,
    pub stats: DashboardStats,
    pub last_run_id: Option<String>,
}

/// Outcome of a settings-page connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Mock mode is active; no backend is contacted.
    MockActive,
    Reachable,
    /// The backend answered with a non-success status.
    Unhealthy { status: u16, reason: String },
    Unreachable { reason: String },
}

impl ConnectionStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConnectionStatus::MockActive | ConnectionStatus::Reachable)
    }

    /// Human-readable summary for the settings view.
    pub fn describe(&self) -> String {
        match self {
            ConnectionStatus::MockActive => "Mock mode is active. No connection needed.".into(),
            ConnectionStatus::Reachable => {
                "Connection successful! Backend is reachable.".into()
            }
            ConnectionStatus::Unhealthy { reason, .. } => {
                format!("Backend reachable but returned {reason}")
            }
            ConnectionStatus::Unreachable { reason } => {
                format!("Failed to connect. Ensure the backend is running. ({reason})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DataClient
// ---------------------------------------------------------------------------

/// Single entry point for data operations.
///
/// The source is chosen once from the injected [`Configuration`] and swapped
/// by [`DataClient::reload`]. Each operation takes its own handle to the
/// current source before doing any I/O, so a reload never affects calls that
/// are already running.
pub struct DataClient {
    source: RwLock<Arc<dyn DataSource>>,
    options: ClientOptions,
}

impl DataClient {
    pub fn new(config: &Configuration, options: ClientOptions) -> Self {
        Self {
            source: RwLock::new(select_source(config, &options)),
            options,
        }
    }

    /// Wrap an already-built source. [`reload`](Self::reload) still works and
    /// uses default options.
    pub fn from_source(source: Arc<dyn DataSource>) -> Self {
        Self {
            source: RwLock::new(source),
            options: ClientOptions::default(),
        }
    }

    /// Re-select the source after the configuration was saved.
    pub fn reload(&self, config: &Configuration) {
        let next = select_source(config, &self.options);
        info!(source = %next.kind(), api_base_url = %config.api_base_url, "data source reloaded");
        match self.source.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.current().kind()
    }

    fn current(&self) -> Arc<dyn DataSource> {
        match self.source.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub async fn list_runs(&self) -> Result<Vec<Run>, DataError> {
        let source = self.current();
        let result = source.list_runs().await;
        log_outcome(Operation::ListRuns, source.kind(), &result);
        result
    }

    pub async fn list_findings(&self, run_id: Option<&str>) -> Result<Vec<Finding>, DataError> {
        let source = self.current();
        let result = source.list_findings(run_id).await;
        log_outcome(Operation::ListFindings, source.kind(), &result);
        result
    }

    pub async fn get_trend(&self) -> Result<Vec<TrendPoint>, DataError> {
        let source = self.current();
        let result = source.get_trend().await;
        log_outcome(Operation::GetTrend, source.kind(), &result);
        result
    }

    pub async fn trigger_scan(&self) -> Result<ScanTicket, DataError> {
        let source = self.current();
        let result = source.trigger_scan().await;
        log_outcome(Operation::TriggerScan, source.kind(), &result);
        result
    }

    pub async fn generate_report(&self, run_id: &str) -> Result<ReportLink, DataError> {
        let source = self.current();
        let result = source.generate_report(run_id).await;
        log_outcome(Operation::GenerateReport, source.kind(), &result);
        result
    }

    /// Fetch findings, trend and runs concurrently and derive the stats.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot, DataError> {
        let (findings, trend, runs) = tokio::try_join!(
            self.list_findings(None),
            self.get_trend(),
            self.list_runs()
        )?;
        let stats = DashboardStats::from_findings(&findings);
        let last_run_id = runs.last().map(|r| r.run_id.clone());
        Ok(DashboardSnapshot {
            findings,
            trend,
            runs,
            stats,
            last_run_id,
        })
    }

    /// Test `config` without making it the active configuration.
    pub async fn test_connection(&self, config: &Configuration) -> ConnectionStatus {
        if !config.use_remote {
            return ConnectionStatus::MockActive;
        }
        let status = RemoteSource::new(&config.api_base_url, self.options.request_timeout)
            .probe()
            .await;
        info!(api_base_url = %config.api_base_url, ok = status.is_ok(), "connection test");
        status
    }
}

fn select_source(config: &Configuration, options: &ClientOptions) -> Arc<dyn DataSource> {
    if config.use_remote {
        Arc::new(RemoteSource::new(
            &config.api_base_url,
            options.request_timeout,
        ))
    } else {
        Arc::new(MockSource::new(options.latency))
    }
}

fn log_outcome<T>(operation: Operation, kind: SourceKind, result: &Result<T, DataError>) {
    match result {
        Ok(_) => info!(operation = operation.name(), source = %kind, "data operation completed"),
        Err(e) => warn!(operation = operation.name(), source = %kind, error = %e, "data operation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> ClientOptions {
        ClientOptions {
            latency: Latency::none(),
            ..Default::default()
        }
    }

    #[test]
    fn default_configuration_selects_mock() {
        let client = DataClient::new(&Configuration::default(), instant());
        assert_eq!(client.source_kind(), SourceKind::Mock);
    }

    #[test]
    fn reload_switches_source() {
        let client = DataClient::new(&Configuration::default(), instant());
        client.reload(&Configuration::remote("http://127.0.0.1:1/api"));
        assert_eq!(client.source_kind(), SourceKind::Remote);
        client.reload(&Configuration::mock());
        assert_eq!(client.source_kind(), SourceKind::Mock);
    }

    #[test]
    fn options_from_client_config() {
        let cfg = ClientConfig {
            request_timeout_secs: 3,
            simulate_latency: false,
        };
        let options = ClientOptions::from(&cfg);
        assert_eq!(options.request_timeout, Duration::from_secs(3));
        assert_eq!(options.latency, Latency::none());
    }

    #[tokio::test]
    async fn dashboard_snapshot_from_mock() {
        let client = DataClient::new(&Configuration::default(), instant());
        let snapshot = client.dashboard().await.unwrap();

        assert_eq!(snapshot.findings.len(), 6);
        assert_eq!(snapshot.trend.len(), 4);
        assert_eq!(snapshot.runs.len(), 5);
        assert_eq!(snapshot.stats.high, 3);
        assert_eq!(snapshot.stats.medium, 2);
        assert_eq!(snapshot.stats.low, 1);
        assert_eq!(snapshot.last_run_id.as_deref(), Some("run-20231029-001"));
    }

    #[tokio::test]
    async fn test_connection_in_mock_mode() {
        let client = DataClient::new(&Configuration::default(), instant());
        let status = client.test_connection(&Configuration::mock()).await;
        assert_eq!(status, ConnectionStatus::MockActive);
        assert!(status.is_ok());
    }

    #[test]
    fn connection_status_serializes_with_state_tag() {
        let unhealthy = ConnectionStatus::Unhealthy {
            status: 502,
            reason: "502 Bad Gateway".into(),
        };
        assert_eq!(
            serde_json::to_value(&unhealthy).unwrap(),
            serde_json::json!({ "state": "unhealthy", "status": 502, "reason": "502 Bad Gateway" })
        );
        assert_eq!(
            serde_json::to_value(ConnectionStatus::MockActive).unwrap(),
            serde_json::json!({ "state": "mock_active" })
        );
    }
}
