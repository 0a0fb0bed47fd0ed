//! Ledgerdesk - command-line client for the accounting-office API
//!
//! Main entry point for the Ledgerdesk CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod commands;

use commands::{auth, clients, config, licenses, obligations, portal, reports, transactions, users};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Ledgerdesk - accounting office management from the terminal
#[derive(Parser)]
#[command(name = "ledgerdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URL (default: from config, then http://localhost:8000/api/v1)
    #[arg(long, global = true, env = "LEDGERDESK_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in, log out and inspect the session
    Auth(auth::AuthArgs),

    /// Manage client companies
    Clients(clients::ClientsArgs),

    /// Track fiscal obligations
    Obligations(obligations::ObligationsArgs),

    /// Fees, expenses and invoices
    Transactions(transactions::TransactionsArgs),

    /// Licenses and permits
    Licenses(licenses::LicensesArgs),

    /// Generate and list reports
    Reports(reports::ReportsArgs),

    /// User administration
    Users(users::UsersArgs),

    /// Client portal views
    Portal(portal::PortalArgs),

    /// Show or initialize configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "ledgerdesk=debug,ledgerdesk_client=debug,ledgerdesk_config=debug,warn"
    } else {
        "ledgerdesk=warn,ledgerdesk_client=warn,ledgerdesk_config=warn,error"
    };

    let log_dir = ledgerdesk_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "ledgerdesk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "ledgerdesk=debug,ledgerdesk_client=debug,ledgerdesk_config=debug,info",
                )),
        )
        .init();

    if let Err(e) = run(cli).await {
        report_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut client_config = ledgerdesk_config::load_client_config()?;
    client_config.apply_api_url_override(cli.api_url);

    let ctx = commands::Context {
        config: client_config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Clients(args) => clients::run(args, &ctx).await,
        Commands::Obligations(args) => obligations::run(args, &ctx).await,
        Commands::Transactions(args) => transactions::run(args, &ctx).await,
        Commands::Licenses(args) => licenses::run(args, &ctx).await,
        Commands::Reports(args) => reports::run(args, &ctx).await,
        Commands::Users(args) => users::run(args, &ctx).await,
        Commands::Portal(args) => portal::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}

fn report_error(e: &anyhow::Error) {
    let red = Style::new().red();
    let dim = Style::new().dim();
    eprintln!("{} {}", red.apply_to("Error:"), e);

    if let Some(api_error) = e.downcast_ref::<ledgerdesk_client::Error>()
        && (api_error.is_session_ended() || api_error.status() == Some(401))
    {
        eprintln!(
            "{}",
            dim.apply_to("Session expired or missing. Run 'ledgerdesk auth login'.")
        );
    }
}
