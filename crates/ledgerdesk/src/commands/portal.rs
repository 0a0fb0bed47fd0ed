//! Portal command - what a client company sees.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use ledgerdesk_client::summary::{LicenseStatus, license_status};

use super::{Context, format_cents, print_dim, print_header, truncate};

/// Arguments for the portal command.
#[derive(Args, Debug)]
pub struct PortalArgs {
    #[command(subcommand)]
    pub command: PortalCommand,
}

#[derive(Subcommand, Debug)]
pub enum PortalCommand {
    /// Company overview: pending obligations, open invoices, licenses
    Dashboard,

    /// Documents shared with the company
    Documents,

    /// All obligations of the company
    Obligations,
}

/// Run the portal command.
pub async fn run(args: PortalArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();
    let today = ctx.today();

    match args.command {
        PortalCommand::Dashboard => {
            let dashboard = client.portal().dashboard().await?;
            if ctx.print_json(&dashboard)? {
                return Ok(());
            }

            print_header(dashboard.company.display_name());
            println!();

            println!("{}", style("Pending obligations").bold());
            if dashboard.pending_obligations.is_empty() {
                print_dim("  Nothing pending");
            }
            for obligation in &dashboard.pending_obligations {
                let due = if obligation.due_date < today {
                    Style::new()
                        .red()
                        .apply_to(format!("overdue since {}", obligation.due_date))
                        .to_string()
                } else {
                    format!("due {}", obligation.due_date)
                };
                println!("  {:<32} {}", truncate(&obligation.name, 32), due);
            }
            println!();

            println!("{}", style("Open invoices").bold());
            if dashboard.open_invoices.is_empty() {
                print_dim("  No open invoices");
            }
            let total: i64 = dashboard.open_invoices.iter().map(|t| t.amount_cents).sum();
            for invoice in &dashboard.open_invoices {
                println!(
                    "  {:<32} {:>12} {}",
                    truncate(&invoice.description, 32),
                    format_cents(invoice.amount_cents),
                    dim.apply_to(format!("due {}", invoice.due_date))
                );
            }
            if !dashboard.open_invoices.is_empty() {
                println!("  {:<32} {:>12}", style("Total").bold(), format_cents(total));
            }
            println!();

            println!("{}", style("Licenses").bold());
            if dashboard.licenses.is_empty() {
                print_dim("  No licenses on file");
            }
            for license in &dashboard.licenses {
                let state = match license_status(license, today, ctx.config.license_warn_days) {
                    LicenseStatus::Valid => dim.apply_to("valid").to_string(),
                    LicenseStatus::ExpiringSoon { days_left } => Style::new()
                        .yellow()
                        .apply_to(format!("renew within {} days", days_left))
                        .to_string(),
                    LicenseStatus::Expired => Style::new().red().apply_to("expired").to_string(),
                };
                println!(
                    "  {:<32} {} {}",
                    truncate(&license.name, 32),
                    license.expires_on,
                    state
                );
            }
        }
        PortalCommand::Documents => {
            let documents = client.portal().documents().await?;
            if ctx.print_json(&documents)? {
                return Ok(());
            }

            print_header("Documents");
            if documents.is_empty() {
                print_dim("No documents shared yet");
            }
            for document in &documents {
                println!(
                    "{} {:<40} {}",
                    dim.apply_to(document.uploaded_at.format("%Y-%m-%d")),
                    truncate(&document.name, 40),
                    document.download_url.as_deref().unwrap_or("")
                );
            }
        }
        PortalCommand::Obligations => {
            let obligations = client.portal().obligations().await?;
            if ctx.print_json(&obligations)? {
                return Ok(());
            }

            print_header("Obligations");
            if obligations.is_empty() {
                print_dim("No obligations");
            }
            for obligation in &obligations {
                println!(
                    "{} {:<32} {} {:?}",
                    dim.apply_to(&obligation.period),
                    truncate(&obligation.name, 32),
                    obligation.due_date,
                    obligation.status
                );
            }
        }
    }

    Ok(())
}
