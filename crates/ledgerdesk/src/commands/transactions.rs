//! Transactions command - fees, expenses, invoices and receivables aging.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use console::{Style, style};
use ledgerdesk_client::summary::{self, AgingBucket};
use ledgerdesk_client::{
    ApiClient, CreateTransactionRequest, ListTransactionsQuery, Transaction, TransactionKind,
    TransactionStatus, UpdateTransactionRequest,
};

use super::{
    Context, format_cents, parse_cents, print_dim, print_header, print_page_footer, print_success,
    truncate,
};

/// Page size used when aging the whole receivables ledger.
const AGING_PAGE_SIZE: u32 = 200;

/// Arguments for the transactions command.
#[derive(Args, Debug)]
pub struct TransactionsArgs {
    #[command(subcommand)]
    pub command: TransactionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum TransactionsCommand {
    /// List transactions
    List {
        /// Only this client's transactions
        #[arg(long)]
        client: Option<String>,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Record a fee or expense
    Create {
        #[arg(long, value_enum)]
        kind: KindArg,

        #[arg(long)]
        description: String,

        /// Amount, e.g. 150.00
        #[arg(long, value_parser = parse_cents, allow_hyphen_values = true)]
        amount: i64,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,

        /// Client billed (receivables)
        #[arg(long)]
        client: Option<String>,
    },

    /// Mark a transaction as paid
    Pay {
        /// Transaction ID
        id: String,

        /// Payment date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },

    /// Issue the invoice for a receivable
    Invoice {
        /// Transaction ID
        id: String,
    },

    /// Cancel an issued invoice
    CancelInvoice {
        /// Transaction ID
        id: String,
    },

    /// Open receivables grouped by days past due
    Aging {
        /// Only this client's receivables
        #[arg(long)]
        client: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Receivable,
    Payable,
}

impl From<KindArg> for TransactionKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Receivable => TransactionKind::Receivable,
            KindArg::Payable => TransactionKind::Payable,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Open,
    Paid,
    Cancelled,
}

impl From<StatusArg> for TransactionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => TransactionStatus::Open,
            StatusArg::Paid => TransactionStatus::Paid,
            StatusArg::Cancelled => TransactionStatus::Cancelled,
        }
    }
}

/// Run the transactions command.
pub async fn run(args: TransactionsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    match args.command {
        TransactionsCommand::List {
            client: client_id,
            kind,
            status,
            page,
        } => {
            let query = ListTransactionsQuery {
                client_id,
                kind: kind.map(Into::into),
                status: status.map(Into::into),
                page,
                page_size: None,
            };
            let transactions = client.transactions().list(&query).await?;
            if ctx.print_json(&transactions)? {
                return Ok(());
            }

            print_header("Transactions");
            if transactions.items.is_empty() {
                print_dim("No transactions found");
            }
            for transaction in &transactions.items {
                print_transaction(transaction);
            }
            print_page_footer(&transactions);
        }
        TransactionsCommand::Create {
            kind,
            description,
            amount,
            due,
            client: client_id,
        } => {
            let transaction = client
                .transactions()
                .create(CreateTransactionRequest {
                    client_id,
                    kind: kind.into(),
                    description,
                    amount_cents: amount,
                    due_date: due,
                })
                .await?;
            if !ctx.print_json(&transaction)? {
                print_success(&format!(
                    "Recorded {} {}",
                    format_cents(transaction.amount_cents),
                    dim.apply_to(&transaction.id)
                ));
            }
        }
        TransactionsCommand::Pay { id, on } => {
            let request = UpdateTransactionRequest {
                status: Some(TransactionStatus::Paid),
                paid_on: Some(on.unwrap_or_else(|| ctx.today())),
                ..Default::default()
            };
            let transaction = client.transactions().update(&id, request).await?;
            if !ctx.print_json(&transaction)? {
                print_success(&format!("Paid: {}", transaction.description));
            }
        }
        TransactionsCommand::Invoice { id } => {
            let transaction = client.transactions().issue_invoice(&id).await?;
            if !ctx.print_json(&transaction)? {
                print_success(&format!(
                    "Invoice issued: {}",
                    transaction.invoice_number.as_deref().unwrap_or("(pending number)")
                ));
            }
        }
        TransactionsCommand::CancelInvoice { id } => {
            let transaction = client.transactions().cancel_invoice(&id).await?;
            if !ctx.print_json(&transaction)? {
                print_success(&format!("Invoice cancelled: {}", transaction.description));
            }
        }
        TransactionsCommand::Aging { client: client_id } => {
            let receivables = fetch_open_receivables(&client, client_id).await?;
            let report = summary::aging_buckets(&receivables, ctx.today());
            if ctx.print_json(&report)? {
                return Ok(());
            }

            print_header("Receivables aging");
            print_bucket("Current", &report.current);
            print_bucket("1-30 days", &report.days_1_30);
            print_bucket("31-60 days", &report.days_31_60);
            print_bucket("61-90 days", &report.days_61_90);
            print_bucket("Over 90", &report.over_90);
            println!("{}", dim.apply_to("─".repeat(50)));
            println!(
                "{:<12} {:>14}   {}",
                style("Total").bold(),
                format_cents(report.total_cents()),
                Style::new()
                    .red()
                    .apply_to(format!("{} overdue", format_cents(report.overdue_cents())))
            );
        }
    }

    Ok(())
}

async fn fetch_open_receivables(
    client: &ApiClient,
    client_id: Option<String>,
) -> Result<Vec<Transaction>> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let query = ListTransactionsQuery {
            client_id: client_id.clone(),
            kind: Some(TransactionKind::Receivable),
            status: Some(TransactionStatus::Open),
            page: Some(page),
            page_size: Some(AGING_PAGE_SIZE),
        };
        let result = client.transactions().list(&query).await?;
        let has_next = result.has_next() && !result.items.is_empty();
        all.extend(result.items);
        if !has_next {
            break;
        }
        page += 1;
    }
    Ok(all)
}

fn print_transaction(transaction: &Transaction) {
    let dim = Style::new().dim();
    let amount = match transaction.kind {
        TransactionKind::Payable => Style::new()
            .red()
            .apply_to(format!("-{}", format_cents(transaction.amount_cents)))
            .to_string(),
        _ => format_cents(transaction.amount_cents),
    };
    let status = match transaction.status {
        TransactionStatus::Open => "open",
        TransactionStatus::Paid => "paid",
        TransactionStatus::Cancelled => "cancelled",
        TransactionStatus::Unknown => "unknown",
    };
    println!(
        "{} {:<32} {:>12} {} {}",
        dim.apply_to(format!("[{}]", transaction.id)),
        truncate(&transaction.description, 32),
        amount,
        transaction.due_date,
        dim.apply_to(status)
    );
}

fn print_bucket(label: &str, bucket: &AgingBucket) {
    let dim = Style::new().dim();
    println!(
        "{:<12} {:>14}   {}",
        label,
        format_cents(bucket.amount_cents),
        dim.apply_to(format!("{} open", bucket.count))
    );
}
