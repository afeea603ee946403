use std::fmt;

use async_trait::async_trait;
use scout_core::types::{Finding, ReportLink, Run, ScanTicket, TrendPoint};

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Mock,
    Remote,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Mock => write!(f, "mock"),
            SourceKind::Remote => write!(f, "remote"),
        }
    }
}

/// Capability set shared by the mock and remote backends.
///
/// Every call is independent: no retries, caching or deduplication.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn list_runs(&self) -> Result<Vec<Run>, DataError>;

    /// All findings, or only those of `run_id` when given.
    async fn list_findings(&self, run_id: Option<&str>) -> Result<Vec<Finding>, DataError>;

    async fn get_trend(&self) -> Result<Vec<TrendPoint>, DataError>;

    async fn trigger_scan(&self) -> Result<ScanTicket, DataError>;

    async fn generate_report(&self, run_id: &str) -> Result<ReportLink, DataError>;
}
