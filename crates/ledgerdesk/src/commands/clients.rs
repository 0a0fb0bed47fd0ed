//! Clients command - client company management.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use console::Style;
use ledgerdesk_client::{ClientStatus, CreateCompanyRequest, ListClientsQuery, UpdateCompanyRequest};

use super::{Context, print_dim, print_header, print_page_footer, print_success, truncate};

/// Arguments for the clients command.
#[derive(Args, Debug)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClientsCommand {
    /// List client companies
    List {
        /// Filter by name or tax id
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show a client company
    Show {
        /// Client ID
        id: String,
    },

    /// Register a client company
    Create {
        /// Registered legal name
        #[arg(long)]
        legal_name: String,

        /// Tax registration number
        #[arg(long)]
        tax_id: String,

        #[arg(long)]
        trade_name: Option<String>,

        #[arg(long)]
        tax_regime: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Change a client's status
    SetStatus {
        /// Client ID
        id: String,

        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Delete a client company
    Delete {
        /// Client ID
        id: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Active,
    Inactive,
    Suspended,
}

impl From<StatusArg> for ClientStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => ClientStatus::Active,
            StatusArg::Inactive => ClientStatus::Inactive,
            StatusArg::Suspended => ClientStatus::Suspended,
        }
    }
}

/// Run the clients command.
pub async fn run(args: ClientsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    match args.command {
        ClientsCommand::List {
            search,
            status,
            page,
        } => {
            let query = ListClientsQuery {
                search,
                status: status.map(Into::into),
                page,
                page_size: None,
            };
            let companies = client.clients().list(&query).await?;
            if ctx.print_json(&companies)? {
                return Ok(());
            }

            print_header("Clients");
            if companies.items.is_empty() {
                print_dim("No clients found");
            }
            for company in &companies.items {
                println!(
                    "{} {:<40} {} {}",
                    dim.apply_to(format!("[{}]", company.id)),
                    truncate(company.display_name(), 40),
                    company.tax_id,
                    status_label(company.status)
                );
            }
            print_page_footer(&companies);
        }
        ClientsCommand::Show { id } => {
            let company = client.clients().get(&id).await?;
            if ctx.print_json(&company)? {
                return Ok(());
            }

            print_header(company.display_name());
            println!("  {} {}", dim.apply_to("Legal name:"), company.legal_name);
            println!("  {} {}", dim.apply_to("Tax id:    "), company.tax_id);
            println!("  {} {}", dim.apply_to("Status:    "), status_label(company.status));
            if let Some(regime) = &company.tax_regime {
                println!("  {} {}", dim.apply_to("Regime:    "), regime);
            }
            if let Some(email) = &company.email {
                println!("  {} {}", dim.apply_to("Email:     "), email);
            }
            if let Some(phone) = &company.phone {
                println!("  {} {}", dim.apply_to("Phone:     "), phone);
            }
        }
        ClientsCommand::Create {
            legal_name,
            tax_id,
            trade_name,
            tax_regime,
            email,
            phone,
        } => {
            let company = client
                .clients()
                .create(CreateCompanyRequest {
                    legal_name,
                    tax_id,
                    trade_name,
                    tax_regime,
                    email,
                    phone,
                })
                .await?;
            if !ctx.print_json(&company)? {
                print_success(&format!(
                    "Client created: {} {}",
                    company.display_name(),
                    dim.apply_to(&company.id)
                ));
            }
        }
        ClientsCommand::SetStatus { id, status } => {
            let request = UpdateCompanyRequest {
                status: Some(status.into()),
                ..Default::default()
            };
            let company = client.clients().update(&id, request).await?;
            if !ctx.print_json(&company)? {
                print_success(&format!(
                    "{} is now {}",
                    company.display_name(),
                    status_label(company.status)
                ));
            }
        }
        ClientsCommand::Delete { id } => {
            client.clients().delete(&id).await?;
            if !ctx.print_json(&serde_json::json!({ "deleted": id }))? {
                print_success(&format!("Client deleted: {}", id));
            }
        }
    }

    Ok(())
}

fn status_label(status: ClientStatus) -> String {
    match status {
        ClientStatus::Active => Style::new().green().apply_to("active").to_string(),
        ClientStatus::Inactive => Style::new().dim().apply_to("inactive").to_string(),
        ClientStatus::Suspended => Style::new().red().apply_to("suspended").to_string(),
        ClientStatus::Unknown => "unknown".to_string(),
    }
}
