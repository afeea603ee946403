use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use scout_core::types::{Finding, ReportLink, Run, RunStatus, ScanTicket, Severity, TrendPoint};
use serde_json::json;

use crate::error::DataError;
use crate::source::{DataSource, SourceKind};

// ---------------------------------------------------------------------------
// Latency
// ---------------------------------------------------------------------------

/// Artificial delays applied by [`MockSource`] so loading states show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub read: Duration,
    pub scan: Duration,
    pub report: Duration,
}

impl Latency {
    /// 600 ms reads, 1200 ms scan trigger, 1500 ms report generation.
    pub const fn standard() -> Self {
        Self {
            read: Duration::from_millis(600),
            scan: Duration::from_millis(1200),
            report: Duration::from_millis(1500),
        }
    }

    pub const fn none() -> Self {
        Self {
            read: Duration::ZERO,
            scan: Duration::ZERO,
            report: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::standard()
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// MockDataset
// ---------------------------------------------------------------------------

/// Immutable snapshot of runs, findings and trend points.
#[derive(Debug, Clone, PartialEq)]
pub struct MockDataset {
    pub runs: Vec<Run>,
    pub findings: Vec<Finding>,
    pub trend: Vec<TrendPoint>,
}

impl MockDataset {
    /// The built-in snapshot, created on first use and shared afterwards.
    pub fn builtin() -> Arc<MockDataset> {
        static DATASET: OnceLock<Arc<MockDataset>> = OnceLock::new();
        DATASET.get_or_init(|| Arc::new(build_builtin())).clone()
    }

    /// Findings of `run_id` (or all of them), in snapshot order.
    pub fn findings_for(&self, run_id: Option<&str>) -> Vec<Finding> {
        match run_id {
            Some(id) => self
                .findings
                .iter()
                .filter(|f| f.run_id == id)
                .cloned()
                .collect(),
            None => self.findings.clone(),
        }
    }
}

fn run(run_id: &str, timestamp: &str, status: RunStatus, total_findings: u32) -> Run {
    Run {
        run_id: run_id.into(),
        timestamp: timestamp.into(),
        status,
        total_findings,
    }
}

#[allow(clippy::too_many_arguments)]
fn finding(
    id: &str,
    run_id: &str,
    rule_id: &str,
    severity: Severity,
    service: &str,
    description: &str,
    remediation_steps: &str,
    resource_id: &str,
    evidence: serde_json::Value,
) -> Finding {
    Finding {
        id: id.into(),
        run_id: run_id.into(),
        rule_id: rule_id.into(),
        severity,
        service: service.into(),
        description: description.into(),
        remediation_steps: remediation_steps.into(),
        resource_id: resource_id.into(),
        evidence,
    }
}

fn trend_point(date: &str, high: u32, medium: u32, low: u32) -> TrendPoint {
    TrendPoint {
        date: date.into(),
        high,
        medium,
        low,
    }
}

fn build_builtin() -> MockDataset {
    let runs = vec![
        run("run-20231025-001", "2023-10-25T08:00:00Z", RunStatus::Completed, 12),
        run("run-20231026-001", "2023-10-26T08:00:00Z", RunStatus::Completed, 15),
        run("run-20231027-001", "2023-10-27T08:00:00Z", RunStatus::Completed, 8),
        run("run-20231028-001", "2023-10-28T08:00:00Z", RunStatus::Completed, 20),
        run("run-20231029-001", "2023-10-29T08:00:00Z", RunStatus::Running, 0),
    ];

    let findings = vec![
        finding(
            "f-101",
            "run-20231028-001",
            "AZ-STORAGE-001",
            Severity::High,
            "Storage Accounts",
            "Storage account allows public access.",
            "Set \"Allow Blob Public Access\" to Disabled in Configuration.",
            "/subscriptions/sub-1/resourceGroups/rg-prod/providers/Microsoft.Storage/storageAccounts/proddata",
            json!({ "publicAccess": true, "encryption": "Microsoft.Storage" }),
        ),
        finding(
            "f-102",
            "run-20231028-001",
            "AZ-SQL-004",
            Severity::High,
            "SQL Database",
            "SQL Server Firewall allows 0.0.0.0-255.255.255.255",
            "Remove the firewall rule allowing all IPs.",
            "sql-prod-db-01",
            json!({
                "firewallRules": [
                    { "name": "AllowAll", "startIp": "0.0.0.0", "endIp": "255.255.255.255" }
                ]
            }),
        ),
        finding(
            "f-103",
            "run-20231028-001",
            "AZ-VM-002",
            Severity::Medium,
            "Virtual Machines",
            "Disk encryption not enabled on data disks.",
            "Enable Azure Disk Encryption (ADE) for the VM.",
            "vm-frontend-01",
            json!({ "osDisk": "Encrypted", "dataDisks": ["Unencrypted"] }),
        ),
        finding(
            "f-104",
            "run-20231028-001",
            "AZ-IAM-010",
            Severity::Low,
            "IAM",
            "Too many owners assigned to subscription.",
            "Reduce the number of Owner role assignments to less than 3.",
            "/subscriptions/sub-1",
            json!({
                "ownerCount": 5,
                "owners": [
                    "alice@corp.com",
                    "bob@corp.com",
                    "charlie@corp.com",
                    "dave@corp.com",
                    "eve@corp.com"
                ]
            }),
        ),
        finding(
            "f-105",
            "run-20231028-001",
            "AZ-NET-005",
            Severity::Medium,
            "Network",
            "RDP (3389) open to internet.",
            "Restrict RDP access to specific IP ranges or use Bastion.",
            "nsg-frontend",
            json!({ "rule": "AllowRDP", "port": 3389, "source": "*" }),
        ),
        finding(
            "f-001",
            "run-20231025-001",
            "AZ-STORAGE-001",
            Severity::High,
            "Storage Accounts",
            "Storage account allows public access.",
            "Set \"Allow Blob Public Access\" to Disabled in Configuration.",
            "st-legacy",
            json!({ "publicAccess": true }),
        ),
    ];

    let trend = vec![
        trend_point("10/25", 2, 5, 5),
        trend_point("10/26", 3, 8, 4),
        trend_point("10/27", 1, 4, 3),
        trend_point("10/28", 4, 10, 6),
    ];

    MockDataset {
        runs,
        findings,
        trend,
    }
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// Resolves every operation against a [`MockDataset`] after a simulated delay.
#[derive(Debug, Clone)]
pub struct MockSource {
    dataset: Arc<MockDataset>,
    latency: Latency,
}

impl MockSource {
    /// Built-in dataset with the given latency profile.
    pub fn new(latency: Latency) -> Self {
        Self::with_dataset(MockDataset::builtin(), latency)
    }

    pub fn with_dataset(dataset: Arc<MockDataset>, latency: Latency) -> Self {
        Self { dataset, latency }
    }

    pub fn dataset(&self) -> &MockDataset {
        &self.dataset
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(Latency::standard())
    }
}

#[async_trait]
impl DataSource for MockSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Mock
    }

    async fn list_runs(&self) -> Result<Vec<Run>, DataError> {
        pause(self.latency.read).await;
        Ok(self.dataset.runs.clone())
    }

    async fn list_findings(&self, run_id: Option<&str>) -> Result<Vec<Finding>, DataError> {
        pause(self.latency.read).await;
        Ok(self.dataset.findings_for(run_id))
    }

    async fn get_trend(&self) -> Result<Vec<TrendPoint>, DataError> {
        pause(self.latency.read).await;
        Ok(self.dataset.trend.clone())
    }

    async fn trigger_scan(&self) -> Result<ScanTicket, DataError> {
        pause(self.latency.scan).await;
        Ok(ScanTicket {
            message: "Scan initiated successfully".into(),
            run_id: format!("run-{}", Utc::now().timestamp_millis()),
        })
    }

    async fn generate_report(&self, _run_id: &str) -> Result<ReportLink, DataError> {
        pause(self.latency.report).await;
        Ok(ReportLink { url: "#".into() })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
