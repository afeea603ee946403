mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scout_core::types::Severity;

use commands::Context;

/// Sentinel Scout CLI -- inspect cloud security findings and talk to the assistant.
#[derive(Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Directory holding the connection settings and scout.toml.
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary of the latest findings, runs and trend (default).
    Dashboard,

    /// List scan runs in the order the source returns them.
    Runs,

    /// List findings.
    Findings {
        /// Only findings produced by this run.
        #[arg(long)]
        run_id: Option<String>,
        /// Only findings of this severity (High, Medium, Low, Informational).
        #[arg(long)]
        severity: Option<Severity>,
    },

    /// Show the vulnerability trend.
    Trend,

    /// Start a new scan.
    Scan,

    /// Generate a report for a run.
    Report {
        /// Run to report on.
        run_id: String,
    },

    /// Show or change where data comes from.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Chat with the security assistant on stdin.
    Chat,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored connection settings.
    Show,

    /// Change the connection settings.
    Set {
        /// Use the remote backend.
        #[arg(long, conflicts_with = "mock")]
        remote: bool,
        /// Use the built-in mock dataset.
        #[arg(long)]
        mock: bool,
        /// Backend base URL, e.g. http://localhost:5000/api.
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Check that the backend answers.
    Test {
        /// Test this URL instead of the stored one.
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ctx = Context::load(cli.config_dir, cli.json);

    match cli.command {
        None | Some(Commands::Dashboard) => commands::data::dashboard(&ctx).await?,
        Some(Commands::Runs) => commands::data::runs(&ctx).await?,
        Some(Commands::Findings { run_id, severity }) => {
            commands::data::findings(&ctx, run_id.as_deref(), severity).await?
        }
        Some(Commands::Trend) => commands::data::trend(&ctx).await?,
        Some(Commands::Scan) => commands::data::scan(&ctx).await?,
        Some(Commands::Report { run_id }) => commands::data::report(&ctx, &run_id).await?,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&ctx)?,
            ConfigAction::Set {
                remote,
                mock,
                api_url,
            } => {
                let mode = match (remote, mock) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                commands::config::set(&ctx, mode, api_url)?
            }
            ConfigAction::Test { api_url } => commands::config::test(&ctx, api_url).await?,
        },
        Some(Commands::Chat) => commands::chat::run(&ctx).await?,
    }

    Ok(())
}
