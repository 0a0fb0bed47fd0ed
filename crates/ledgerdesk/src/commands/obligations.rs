//! Obligations command - fiscal obligation tracking.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use console::{Style, style};
use ledgerdesk_client::summary::{self, Progress};
use ledgerdesk_client::{
    CreateObligationRequest, ListObligationsQuery, Obligation, ObligationStatus,
};
use serde_json::json;

use super::{Context, print_dim, print_header, print_page_footer, print_success, truncate};

/// Page size used when summarizing a whole period.
const SUMMARY_PAGE_SIZE: u32 = 200;

/// Arguments for the obligations command.
#[derive(Args, Debug)]
pub struct ObligationsArgs {
    #[command(subcommand)]
    pub command: ObligationsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ObligationsCommand {
    /// List obligations
    List {
        /// Only this client's obligations
        #[arg(long)]
        client: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Competence period, e.g. 2026-09
        #[arg(long)]
        period: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Create an obligation for a client
    Create {
        /// Client ID
        #[arg(long)]
        client: String,

        /// Obligation name, e.g. "Monthly VAT return"
        #[arg(long)]
        name: String,

        /// Competence period, e.g. 2026-09
        #[arg(long)]
        period: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,

        /// Assigned user ID
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Mark an obligation as completed
    Complete {
        /// Obligation ID
        id: String,
    },

    /// Completion progress for a period
    Progress {
        /// Competence period, e.g. 2026-09
        #[arg(long)]
        period: Option<String>,

        /// Break the figures down per client
        #[arg(long)]
        by_client: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Pending,
    InProgress,
    Completed,
    Waived,
}

impl From<StatusArg> for ObligationStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => ObligationStatus::Pending,
            StatusArg::InProgress => ObligationStatus::InProgress,
            StatusArg::Completed => ObligationStatus::Completed,
            StatusArg::Waived => ObligationStatus::Waived,
        }
    }
}

/// Run the obligations command.
pub async fn run(args: ObligationsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    match args.command {
        ObligationsCommand::List {
            client: client_id,
            status,
            period,
            page,
        } => {
            let query = ListObligationsQuery {
                client_id,
                status: status.map(Into::into),
                period,
                page,
                page_size: None,
            };
            let obligations = client.obligations().list(&query).await?;
            if ctx.print_json(&obligations)? {
                return Ok(());
            }

            print_header("Obligations");
            if obligations.items.is_empty() {
                print_dim("No obligations found");
            }
            let today = ctx.today();
            for obligation in &obligations.items {
                print_obligation(obligation, today);
            }
            print_page_footer(&obligations);
        }
        ObligationsCommand::Create {
            client: client_id,
            name,
            period,
            due,
            assignee,
        } => {
            let obligation = client
                .obligations()
                .create(CreateObligationRequest {
                    client_id,
                    name,
                    period,
                    due_date: due,
                    assignee_id: assignee,
                })
                .await?;
            if !ctx.print_json(&obligation)? {
                print_success(&format!(
                    "Obligation created: {} {}",
                    obligation.name,
                    dim.apply_to(&obligation.id)
                ));
            }
        }
        ObligationsCommand::Complete { id } => {
            let obligation = client.obligations().complete(&id).await?;
            if !ctx.print_json(&obligation)? {
                print_success(&format!(
                    "Completed: {} ({})",
                    obligation.name, obligation.period
                ));
            }
        }
        ObligationsCommand::Progress { period, by_client } => {
            let obligations = fetch_all(&client, period.clone()).await?;
            let today = ctx.today();
            let overall = summary::obligation_progress(&obligations, today);

            if by_client {
                let per_client = summary::progress_by_client(&obligations, today);
                if ctx.print_json(&json!({ "overall": overall, "clients": per_client }))? {
                    return Ok(());
                }
                print_progress_header(period.as_deref(), &overall);
                println!();
                for (client_id, progress) in &per_client {
                    println!(
                        "{} {}",
                        dim.apply_to(format!("[{}]", client_id)),
                        progress_line(progress)
                    );
                }
            } else {
                if ctx.print_json(&overall)? {
                    return Ok(());
                }
                print_progress_header(period.as_deref(), &overall);
            }
        }
    }

    Ok(())
}

/// Every obligation of a period, across pages.
async fn fetch_all(
    client: &ledgerdesk_client::ApiClient,
    period: Option<String>,
) -> Result<Vec<Obligation>> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let query = ListObligationsQuery {
            period: period.clone(),
            page: Some(page),
            page_size: Some(SUMMARY_PAGE_SIZE),
            ..Default::default()
        };
        let result = client.obligations().list(&query).await?;
        let has_next = result.has_next() && !result.items.is_empty();
        all.extend(result.items);
        if !has_next {
            break;
        }
        page += 1;
    }
    tracing::debug!(count = all.len(), "fetched obligations for summary");
    Ok(all)
}

fn print_obligation(obligation: &Obligation, today: NaiveDate) {
    let dim = Style::new().dim();
    let status = match obligation.status {
        ObligationStatus::Completed => Style::new().green().apply_to("done").to_string(),
        ObligationStatus::Waived => dim.apply_to("waived").to_string(),
        _ if obligation.due_date < today => Style::new().red().apply_to("overdue").to_string(),
        ObligationStatus::InProgress => Style::new().yellow().apply_to("in progress").to_string(),
        _ => "pending".to_string(),
    };
    println!(
        "{} {:<32} {} {} {}",
        dim.apply_to(format!("[{}]", obligation.id)),
        truncate(&obligation.name, 32),
        obligation.period,
        obligation.due_date,
        status
    );
}

fn print_progress_header(period: Option<&str>, overall: &Progress) {
    let title = match period {
        Some(period) => format!("Obligation progress for {}", period),
        None => "Obligation progress".to_string(),
    };
    print_header(&title);
    println!("{}", progress_line(overall));
}

fn progress_line(progress: &Progress) -> String {
    let overdue = if progress.overdue > 0 {
        Style::new()
            .red()
            .apply_to(format!("{} overdue", progress.overdue))
            .to_string()
    } else {
        Style::new().dim().apply_to("0 overdue").to_string()
    };
    format!(
        "{} {}/{} completed, {}",
        style(format!("{:>5.1}%", progress.percent)).bold(),
        progress.completed,
        progress.total,
        overdue
    )
}
