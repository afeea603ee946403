use std::fmt::Write as _;

use scout_core::types::{Finding, Run, Severity, TrendPoint};
use scout_data::DashboardSnapshot;

use super::{friendly_error, print_json, Context};

/// Report URL the mock source hands back in place of a real document.
const PLACEHOLDER_REPORT_URL: &str = "#";

pub async fn runs(ctx: &Context) -> anyhow::Result<()> {
    let runs = ctx.client.list_runs().await.map_err(friendly_error)?;
    if ctx.json {
        return print_json(&runs);
    }
    print!("{}", render_runs(&runs));
    Ok(())
}

pub async fn findings(
    ctx: &Context,
    run_id: Option<&str>,
    severity: Option<Severity>,
) -> anyhow::Result<()> {
    let mut findings = ctx
        .client
        .list_findings(run_id)
        .await
        .map_err(friendly_error)?;
    if let Some(severity) = severity {
        findings.retain(|f| f.severity == severity);
    }
    if ctx.json {
        return print_json(&findings);
    }
    print!("{}", render_findings(&findings));
    Ok(())
}

pub async fn trend(ctx: &Context) -> anyhow::Result<()> {
    let trend = ctx.client.get_trend().await.map_err(friendly_error)?;
    if ctx.json {
        return print_json(&trend);
    }
    print!("{}", render_trend(&trend));
    Ok(())
}

pub async fn scan(ctx: &Context) -> anyhow::Result<()> {
    let ticket = ctx.client.trigger_scan().await.map_err(friendly_error)?;
    if ctx.json {
        return print_json(&ticket);
    }
    println!("{} (run {})", ticket.message, ticket.run_id);
    Ok(())
}

pub async fn report(ctx: &Context, run_id: &str) -> anyhow::Result<()> {
    let link = ctx
        .client
        .generate_report(run_id)
        .await
        .map_err(friendly_error)?;
    if ctx.json {
        return print_json(&link);
    }
    if link.url == PLACEHOLDER_REPORT_URL {
        println!("Report generated for {run_id} (mock mode, no document produced).");
    } else {
        println!("Report for {run_id}: {}", link.url);
    }
    Ok(())
}

pub async fn dashboard(ctx: &Context) -> anyhow::Result<()> {
    let snapshot = ctx.client.dashboard().await.map_err(friendly_error)?;
    if ctx.json {
        return print_json(&snapshot);
    }
    print!("{}", render_dashboard(&snapshot));
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_runs(runs: &[Run]) -> String {
    if runs.is_empty() {
        return "No scan runs yet.\n".into();
    }
    let mut out = format!("{:<22} {:<22} {:<10} {}\n", "RUN", "STARTED", "STATUS", "FINDINGS");
    for run in runs {
        let _ = writeln!(
            out,
            "{:<22} {:<22} {:<10} {}",
            run.run_id,
            run.timestamp,
            run.status.to_string(),
            run.total_findings
        );
    }
    out
}

fn render_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "No findings.\n".into();
    }
    let mut out = String::new();
    for f in findings {
        let _ = writeln!(
            out,
            "{:<13} {:<18} {:<20} {}",
            f.severity.as_str(),
            f.rule_id,
            f.service,
            f.resource_id
        );
        if !f.description.is_empty() {
            let _ = writeln!(out, "    {}", f.description);
        }
        if !f.remediation_steps.is_empty() {
            let _ = writeln!(out, "    fix: {}", f.remediation_steps);
        }
    }
    out
}

fn render_trend(trend: &[TrendPoint]) -> String {
    let mut out = format!("{:<12} {:>5} {:>7} {:>5}\n", "DATE", "HIGH", "MEDIUM", "LOW");
    for point in trend {
        let _ = writeln!(
            out,
            "{:<12} {:>5} {:>7} {:>5}",
            point.date, point.high, point.medium, point.low
        );
    }
    out
}

fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let stats = &snapshot.stats;
    let mut out = String::from("Sentinel Scout dashboard\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    let _ = writeln!(
        out,
        "Last run:       {}",
        snapshot.last_run_id.as_deref().unwrap_or("none")
    );
    let _ = writeln!(out, "Total findings: {}", stats.total);
    let _ = writeln!(out, "  high:         {}", stats.high);
    let _ = writeln!(out, "  medium:       {}", stats.medium);
    let _ = writeln!(out, "  low:          {}", stats.low);
    let _ = writeln!(out, "  info:         {}", stats.informational);

    if !stats.by_service.is_empty() {
        out.push_str("\nBy service:\n");
        for (service, count) in &stats.by_service {
            let _ = writeln!(out, "  {service:<24} {count}");
        }
    }

    if !snapshot.trend.is_empty() {
        out.push('\n');
        out.push_str(&render_trend(&snapshot.trend));
    }
    out
}
