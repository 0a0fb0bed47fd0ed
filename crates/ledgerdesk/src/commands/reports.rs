//! Reports command.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use console::Style;
use ledgerdesk_client::{GenerateReportRequest, ListReportsQuery, Report, ReportKind, ReportStatus};

use super::{Context, print_dim, print_header, print_page_footer, print_success};

/// Arguments for the reports command.
#[derive(Args, Debug)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportsCommand {
    /// List generated reports
    List {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show one report
    Show {
        /// Report ID
        id: String,
    },

    /// Request a new report
    Generate {
        #[arg(value_enum)]
        kind: KindArg,

        /// First day covered (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day covered (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        /// Restrict to one client
        #[arg(long)]
        client: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Obligations,
    Financial,
    Licenses,
    Clients,
}

impl From<KindArg> for ReportKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Obligations => ReportKind::Obligations,
            KindArg::Financial => ReportKind::Financial,
            KindArg::Licenses => ReportKind::Licenses,
            KindArg::Clients => ReportKind::Clients,
        }
    }
}

/// Run the reports command.
pub async fn run(args: ReportsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match args.command {
        ReportsCommand::List { kind, page } => {
            let query = ListReportsQuery {
                kind: kind.map(Into::into),
                page,
                page_size: None,
            };
            let reports = client.reports().list(&query).await?;
            if ctx.print_json(&reports)? {
                return Ok(());
            }

            print_header("Reports");
            if reports.items.is_empty() {
                print_dim("No reports found");
            }
            for report in &reports.items {
                print_report(report);
            }
            print_page_footer(&reports);
        }
        ReportsCommand::Show { id } => {
            let report = client.reports().get(&id).await?;
            if !ctx.print_json(&report)? {
                print_report(&report);
                if let Some(url) = &report.download_url {
                    println!("  {}", url);
                }
            }
        }
        ReportsCommand::Generate {
            kind,
            from,
            to,
            client: client_id,
        } => {
            if to < from {
                anyhow::bail!("--to ({}) is before --from ({})", to, from);
            }
            let report = client
                .reports()
                .generate(GenerateReportRequest {
                    kind: kind.into(),
                    period_start: from,
                    period_end: to,
                    client_id,
                })
                .await?;
            if !ctx.print_json(&report)? {
                print_success(&format!("Report requested: {}", report.id));
                print_dim("Run 'ledgerdesk reports show <id>' to check progress");
            }
        }
    }

    Ok(())
}

fn print_report(report: &Report) {
    let dim = Style::new().dim();
    let status = match report.status {
        ReportStatus::Ready => Style::new().green().apply_to("ready").to_string(),
        ReportStatus::Failed => Style::new().red().apply_to("failed").to_string(),
        ReportStatus::Queued => dim.apply_to("queued").to_string(),
        ReportStatus::Running => Style::new().yellow().apply_to("running").to_string(),
        ReportStatus::Unknown => "unknown".to_string(),
    };
    println!(
        "{} {:<12} {} {}",
        dim.apply_to(format!("[{}]", report.id)),
        format!("{:?}", report.kind).to_lowercase(),
        report.created_at.format("%Y-%m-%d %H:%M"),
        status
    );
}
