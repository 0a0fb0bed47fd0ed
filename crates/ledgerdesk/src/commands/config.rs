//! Config command - inspect and initialize configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use ledgerdesk_config::ClientConfig;

use super::{Context, print_dim, print_header, print_success};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with the given API URL
    Init {
        /// Backend API URL
        #[arg(long)]
        api_url: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            if ctx.print_json(&ctx.config)? {
                return Ok(());
            }

            let dim = Style::new().dim();
            print_header("Configuration");
            print!("{}", ctx.config.to_toml()?);
            if let Some(path) = ledgerdesk_config::config_path() {
                println!();
                println!("{}", dim.apply_to(format!("# {}", path.display())));
            }
        }
        ConfigCommand::Path => match ledgerdesk_config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("could not determine config directory"),
        },
        ConfigCommand::Init { api_url, force } => {
            let path = ledgerdesk_config::config_path()
                .ok_or(ledgerdesk_config::ConfigError::NoConfigDir)?;
            if path.exists() && !force {
                print_dim(&format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ));
                return Ok(());
            }

            let mut config = ClientConfig::default();
            config.apply_api_url_override(api_url);
            let written = ledgerdesk_config::save_client_config(&config)?;
            print_success(&format!("Wrote {}", written.display()));
        }
    }

    Ok(())
}
