use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a finding. Serialized with its capitalised name (`"High"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    Informational,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Informational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Informational => "Informational",
        }
    }

    /// Case-insensitive name match, e.g. `Severity::High.matches("high")`.
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.matches(s))
            .ok_or_else(|| format!("unknown severity: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
    Running,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Running => write!(f, "running"),
        }
    }
}

/// One scan execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    /// ISO-8601 timestamp as reported by the backend.
    pub timestamp: String,
    pub status: RunStatus,
    #[serde(default)]
    pub total_findings: u32,
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// A detected misconfiguration tied to one run and one cloud resource.
///
/// `run_id` is not checked against the known runs and `evidence` is kept as
/// whatever JSON the source produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub run_id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub service: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub remediation_steps: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub evidence: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Daily finding counts by severity, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// Acknowledgement returned when a scan is triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTicket {
    pub message: String,
    #[serde(rename = "runId")]
    pub run_id: String,
}

/// Location of a generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLink {
    pub url: String,
}

// ---------------------------------------------------------------------------
// DashboardStats
// ---------------------------------------------------------------------------

/// Aggregate counts shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
    pub by_service: BTreeMap<String, usize>,
}

impl DashboardStats {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut stats = DashboardStats {
            total: findings.len(),
            ..Default::default()
        };
        for finding in findings {
            match finding.severity {
                Severity::High => stats.high += 1,
                Severity::Medium => stats.medium += 1,
                Severity::Low => stats.low += 1,
                Severity::Informational => stats.informational += 1,
            }
            *stats.by_service.entry(finding.service.clone()).or_default() += 1;
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One line of a chat transcript. Transcripts live in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
