use std::sync::{Arc, Mutex};

use scout_core::types::Finding;
use scout_data::{DataClient, DataError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::session::ToolCall;

// ---------------------------------------------------------------------------
// Tool declarations
// ---------------------------------------------------------------------------

/// A function the model may ask the application to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// Parameter schema in the hosted model's OpenAPI subset.
    pub parameters: serde_json::Value,
}

pub const LIST_FINDINGS: &str = "listFindings";
pub const GET_TREND: &str = "getTrend";
pub const TRIGGER_SCAN: &str = "triggerScan";
pub const NAVIGATE: &str = "navigate";

/// The fixed tool surface offered to the model.
pub fn tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: LIST_FINDINGS.into(),
            description: "Retrieve security findings. Can filter by severity (High, Medium, Low) or service name."
                .into(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "severity": {
                        "type": "STRING",
                        "description": "Filter by severity: High, Medium, Low, Informational"
                    },
                    "service": {
                        "type": "STRING",
                        "description": "Filter by cloud service name (e.g., Storage Accounts, SQL Database)"
                    }
                }
            }),
        },
        ToolDeclaration {
            name: GET_TREND.into(),
            description: "Get the historical vulnerability trend data (counts of High/Medium/Low over time)."
                .into(),
            parameters: json!({ "type": "OBJECT", "properties": {} }),
        },
        ToolDeclaration {
            name: TRIGGER_SCAN.into(),
            description: "Initiate a new immediate security scan of the cloud infrastructure.".into(),
            parameters: json!({ "type": "OBJECT", "properties": {} }),
        },
        ToolDeclaration {
            name: NAVIGATE.into(),
            description: "Navigate the user to a specific page in the application.".into(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "page": {
                        "type": "STRING",
                        "description": "The page to navigate to. Options: 'dashboard', 'findings', 'reports', 'settings', 'home'."
                    }
                },
                "required": ["page"]
            }),
        },
    ]
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Dashboard,
    Findings,
    Reports,
    Settings,
}

impl Page {
    /// Case-insensitive lookup; anything unrecognised maps to the dashboard.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            Some("home") => Page::Home,
            Some("findings") => Page::Findings,
            Some("reports") => Page::Reports,
            Some("settings") => Page::Settings,
            _ => Page::Dashboard,
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Dashboard => "/dashboard",
            Page::Findings => "/findings",
            Page::Reports => "/reports",
            Page::Settings => "/settings",
        }
    }
}

/// Side channel through which the assistant moves the user between views.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that only records the routes it was asked to open.
#[derive(Debug, Default)]
pub struct NavigationLog {
    routes: Mutex<Vec<String>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<String> {
        self.routes.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// ToolRouter
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum ToolError {
    #[error("Unknown tool")]
    Unknown,
    #[error("invalid arguments: {0}")]
    InvalidArgs(serde_json::Error),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("invalid result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reduced view of a finding handed to the model to keep payloads small.
#[derive(Debug, Clone, Serialize)]
struct FindingSummary<'a> {
    id: &'a str,
    severity: &'a str,
    service: &'a str,
    issue: &'a str,
    resource: &'a str,
    fix: &'a str,
}

impl<'a> From<&'a Finding> for FindingSummary<'a> {
    fn from(f: &'a Finding) -> Self {
        Self {
            id: &f.rule_id,
            severity: f.severity.as_str(),
            service: &f.service,
            issue: &f.description,
            resource: &f.resource_id,
            fix: &f.remediation_steps,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListFindingsArgs {
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    service: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NavigateArgs {
    #[serde(default)]
    page: Option<String>,
}

/// Parse tool arguments. Missing arguments (`null`) mean no arguments.
fn parse_args<T: Default + for<'de> Deserialize<'de>>(
    args: &serde_json::Value,
) -> Result<T, ToolError> {
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args.clone()).map_err(ToolError::InvalidArgs)
}

/// Executes model-requested tools against the data client and navigator.
#[derive(Clone)]
pub struct ToolRouter {
    data: Arc<DataClient>,
    navigator: Arc<dyn Navigator>,
}

impl ToolRouter {
    pub fn new(data: Arc<DataClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self { data, navigator }
    }

    /// Run one tool call. Failures come back as `{"error": message}` so the
    /// model can explain them.
    pub async fn execute(&self, call: &ToolCall) -> serde_json::Value {
        debug!(tool = %call.name, args = %call.args, "executing tool");
        match self.dispatch(call).await {
            Ok(value) => {
                info!(tool = %call.name, is_error = false, "executed tool");
                value
            }
            Err(e) => {
                info!(tool = %call.name, is_error = true, error = %e, "executed tool");
                json!({ "error": e.to_string() })
            }
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError> {
        match call.name.as_str() {
            LIST_FINDINGS => self.list_findings(parse_args(&call.args)?).await,
            GET_TREND => Ok(serde_json::to_value(self.data.get_trend().await?)?),
            TRIGGER_SCAN => Ok(serde_json::to_value(self.data.trigger_scan().await?)?),
            NAVIGATE => Ok(self.navigate(parse_args(&call.args)?)),
            _ => Err(ToolError::Unknown),
        }
    }

    async fn list_findings(&self, args: ListFindingsArgs) -> Result<serde_json::Value, ToolError> {
        let findings = self.data.list_findings(None).await?;

        let severity = args.severity.filter(|s| !s.trim().is_empty());
        let service = args
            .service
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_lowercase());

        let summaries: Vec<FindingSummary<'_>> = findings
            .iter()
            .filter(|f| severity.as_deref().map_or(true, |s| f.severity.matches(s)))
            .filter(|f| {
                service
                    .as_deref()
                    .map_or(true, |s| f.service.to_lowercase().contains(s))
            })
            .map(FindingSummary::from)
            .collect();

        Ok(serde_json::to_value(summaries)?)
    }

    fn navigate(&self, args: NavigateArgs) -> serde_json::Value {
        let route = Page::from_name(args.page.as_deref()).route();
        self.navigator.navigate(route);
        json!({ "success": true, "navigated_to": route })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
