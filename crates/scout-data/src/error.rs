use std::fmt;

use thiserror::Error;

/// The five data operations, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRuns,
    ListFindings,
    GetTrend,
    TriggerScan,
    GenerateReport,
}

impl Operation {
    /// Short identifier for structured logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListRuns => "list_runs",
            Operation::ListFindings => "list_findings",
            Operation::GetTrend => "get_trend",
            Operation::TriggerScan => "trigger_scan",
            Operation::GenerateReport => "generate_report",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::ListRuns => "Failed to fetch runs",
            Operation::ListFindings => "Failed to fetch findings",
            Operation::GetTrend => "Failed to fetch trend",
            Operation::TriggerScan => "Failed to initiate scan",
            Operation::GenerateReport => "Failed to generate report",
        };
        f.write_str(text)
    }
}

/// Errors produced by a data operation. Each one is scoped to the single
/// call that produced it.
#[derive(Debug, Error)]
pub enum DataError {
    /// The configured backend could not be reached (connect, DNS, timeout).
    #[error("{operation}: backend unreachable: {message}")]
    Connectivity { operation: Operation, message: String },

    /// The backend answered with a non-success status.
    #[error("{operation}: {message}")]
    Remote {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// The backend answered 2xx but the body is not the expected shape.
    #[error("{operation}: malformed response: {message}")]
    Decode { operation: Operation, message: String },
}

impl DataError {
    pub fn operation(&self) -> Operation {
        match self {
            DataError::Connectivity { operation, .. }
            | DataError::Remote { operation, .. }
            | DataError::Decode { operation, .. } => *operation,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, DataError::Connectivity { .. })
    }
}
