//! Licenses command - license and permit renewals.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use console::Style;
use ledgerdesk_client::summary::{LicenseStatus, license_status};
use ledgerdesk_client::{CreateLicenseRequest, License, ListLicensesQuery, RenewLicenseRequest};
use serde::Serialize;

use super::{Context, print_dim, print_header, print_page_footer, print_success, truncate};

/// Arguments for the licenses command.
#[derive(Args, Debug)]
pub struct LicensesArgs {
    #[command(subcommand)]
    pub command: LicensesCommand,
}

#[derive(Subcommand, Debug)]
pub enum LicensesCommand {
    /// List licenses with their renewal state
    List {
        /// Only this client's licenses
        #[arg(long)]
        client: Option<String>,

        /// Only licenses expiring within this many days
        #[arg(long)]
        expiring_within: Option<u32>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Register a license
    Create {
        /// Client ID
        #[arg(long)]
        client: String,

        #[arg(long)]
        name: String,

        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires_on: NaiveDate,

        /// Issuing authority
        #[arg(long)]
        issuer: Option<String>,

        /// License number
        #[arg(long)]
        number: Option<String>,
    },

    /// Record a renewal
    Renew {
        /// License ID
        id: String,

        /// New expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires_on: NaiveDate,

        /// New license number, if it changed
        #[arg(long)]
        number: Option<String>,
    },

    /// Delete a license
    Delete {
        /// License ID
        id: String,
    },
}

/// A license with its computed renewal state, for JSON output.
#[derive(Serialize)]
struct LicenseRow<'a> {
    #[serde(flatten)]
    license: &'a License,
    renewal: LicenseStatus,
}

/// Run the licenses command.
pub async fn run(args: LicensesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    match args.command {
        LicensesCommand::List {
            client: client_id,
            expiring_within,
            page,
        } => {
            let query = ListLicensesQuery {
                client_id,
                expiring_within_days: expiring_within,
                page,
                page_size: None,
            };
            let licenses = client.licenses().list(&query).await?;

            let today = ctx.today();
            let warn_days = ctx.config.license_warn_days;
            let rows: Vec<LicenseRow<'_>> = licenses
                .items
                .iter()
                .map(|license| LicenseRow {
                    license,
                    renewal: license_status(license, today, warn_days),
                })
                .collect();
            if ctx.print_json(&rows)? {
                return Ok(());
            }

            print_header("Licenses");
            if rows.is_empty() {
                print_dim("No licenses found");
            }
            for row in &rows {
                println!(
                    "{} {:<32} {} {}",
                    dim.apply_to(format!("[{}]", row.license.id)),
                    truncate(&row.license.name, 32),
                    row.license.expires_on,
                    renewal_label(row.renewal)
                );
            }
            print_page_footer(&licenses);
        }
        LicensesCommand::Create {
            client: client_id,
            name,
            expires_on,
            issuer,
            number,
        } => {
            let license = client
                .licenses()
                .create(CreateLicenseRequest {
                    client_id,
                    name,
                    expires_on,
                    issuer,
                    number,
                    issued_on: None,
                })
                .await?;
            if !ctx.print_json(&license)? {
                print_success(&format!(
                    "License registered: {} {}",
                    license.name,
                    dim.apply_to(&license.id)
                ));
            }
        }
        LicensesCommand::Renew {
            id,
            expires_on,
            number,
        } => {
            let license = client
                .licenses()
                .renew(&id, RenewLicenseRequest { expires_on, number })
                .await?;
            if !ctx.print_json(&license)? {
                print_success(&format!(
                    "{} renewed until {}",
                    license.name, license.expires_on
                ));
            }
        }
        LicensesCommand::Delete { id } => {
            client.licenses().delete(&id).await?;
            if !ctx.print_json(&serde_json::json!({ "deleted": id }))? {
                print_success(&format!("License deleted: {}", id));
            }
        }
    }

    Ok(())
}

fn renewal_label(status: LicenseStatus) -> String {
    match status {
        LicenseStatus::Valid => Style::new().green().apply_to("valid").to_string(),
        LicenseStatus::ExpiringSoon { days_left: 0 } => {
            Style::new().yellow().apply_to("expires today").to_string()
        }
        LicenseStatus::ExpiringSoon { days_left } => Style::new()
            .yellow()
            .apply_to(format!("expires in {} days", days_left))
            .to_string(),
        LicenseStatus::Expired => Style::new().red().apply_to("expired").to_string(),
    }
}
