use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use scout_core::types::{Finding, ReportLink, Run, ScanTicket, TrendPoint};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::ConnectionStatus;
use crate::error::{DataError, Operation};
use crate::source::{DataSource, SourceKind};

/// Talks to the REST backend under a configurable base URL.
///
/// | Method | Path | Query |
/// |---|---|---|
/// | GET | /runs | |
/// | GET | /findings | `run_id` (optional) |
/// | GET | /trend | |
/// | POST | /scan | |
/// | GET | /report | `run_id` |
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self::with_client(base_url, client)
    }

    /// Build a source around an existing client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Check whether the backend answers `GET /runs`.
    pub async fn probe(&self) -> ConnectionStatus {
        match self.client.get(self.url("runs")).send().await {
            Ok(resp) if resp.status().is_success() => ConnectionStatus::Reachable,
            Ok(resp) => ConnectionStatus::Unhealthy {
                status: resp.status().as_u16(),
                reason: status_line(resp.status()),
            },
            Err(e) => ConnectionStatus::Unreachable {
                reason: e.to_string(),
            },
        }
    }

    /// Send `request` once and decode a successful body as `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, DataError> {
        let resp = request
            .send()
            .await
            .map_err(|e| connectivity(operation, &e))?;

        let status = resp.status();
        debug!(operation = operation.name(), status = status.as_u16(), "backend responded");

        if !status.is_success() {
            // The body is best-effort: a failed read still leaves the status line.
            let body = resp.bytes().await.unwrap_or_default();
            return Err(DataError::Remote {
                operation,
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| connectivity(operation, &e))?;
        serde_json::from_slice(&body).map_err(|e| DataError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

fn connectivity(operation: Operation, err: &reqwest::Error) -> DataError {
    let message = if err.is_timeout() {
        format!("request timed out ({err})")
    } else {
        err.to_string()
    };
    DataError::Connectivity { operation, message }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Prefer the body's `error`, then `message` field, else the status line.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|json| {
            json.get("error")
                .and_then(|v| v.as_str())
                .or_else(|| json.get("message").and_then(|v| v.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| status_line(status))
}

#[async_trait]
impl DataSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn list_runs(&self) -> Result<Vec<Run>, DataError> {
        let req = self.client.get(self.url("runs"));
        self.execute(Operation::ListRuns, req).await
    }

    async fn list_findings(&self, run_id: Option<&str>) -> Result<Vec<Finding>, DataError> {
        let mut req = self.client.get(self.url("findings"));
        if let Some(id) = run_id {
            req = req.query(&[("run_id", id)]);
        }
        self.execute(Operation::ListFindings, req).await
    }

    async fn get_trend(&self) -> Result<Vec<TrendPoint>, DataError> {
        let req = self.client.get(self.url("trend"));
        self.execute(Operation::GetTrend, req).await
    }

    async fn trigger_scan(&self) -> Result<ScanTicket, DataError> {
        let req = self.client.post(self.url("scan"));
        self.execute(Operation::TriggerScan, req).await
    }

    async fn generate_report(&self, run_id: &str) -> Result<ReportLink, DataError> {
        let req = self
            .client
            .get(self.url("report"))
            .query(&[("run_id", run_id)]);
        self.execute(Operation::GenerateReport, req).await
    }
}
