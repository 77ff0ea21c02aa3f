use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{
    format_cents, parse_cents, NewTransaction, PaymentMethod, Transaction, TransactionType,
};

/// Aruskas - Cash-Flow Ledger
#[derive(Parser)]
#[command(name = "aruskas")]
#[command(about = "Record incoming and outgoing cash and summarize it by period")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "ARUSKAS_DATABASE", default_value = "aruskas.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// List transactions, newest first
    List {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Only transactions dated on or after this date (YYYY-MM-DD or RFC 3339)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Only transactions dated before this date (exclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Record a transaction
    Add {
        /// Description of the transaction
        keterangan: String,

        /// Gross amount (e.g., "1000" or "1000.50")
        jumlah: String,

        /// Direction: masuk (incoming) or keluar (outgoing)
        #[arg(short, long, default_value = "masuk")]
        tipe: String,

        /// Payment method: online or offline
        #[arg(short, long)]
        metode: Option<String>,

        /// Date of the transaction (YYYY-MM-DD or RFC 3339, defaults to now)
        #[arg(long)]
        date: Option<String>,

        /// Show the computed fee and net amount without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: Option<String>,
    },

    /// Totals since the start of the current day, week or month
    Summary {
        /// Period: daily, weekly, monthly (unknown values use daily)
        #[arg(short, long, default_value = "daily")]
        period: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the running balance and today's movements
    Balance {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export transactions to CSV or JSON
    Export {
        /// What to export: transactions (CSV), full (JSON)
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Default log filter, overridable through `RUST_LOG`.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                let service = LedgerService::init(&self.database).await?;
                service.close().await;
                println!("Database initialized: {}", self.database);
            }

            Commands::List { format, from, to } => {
                let range = match (from, to) {
                    (Some(from), Some(to)) => Some((parse_date(&from)?, parse_date(&to)?)),
                    _ => None,
                };
                let service = LedgerService::connect(&self.database).await?;
                run_list_command(&service, &format, range).await?;
                service.close().await;
            }

            Commands::Add {
                keterangan,
                jumlah,
                tipe,
                metode,
                date,
                dry_run,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let input = build_new_transaction(keterangan, &jumlah, &tipe, metode, date)?;

                if dry_run {
                    let preview = service.preview_transaction(input)?;
                    print_transaction_details("Preview", &preview);
                } else {
                    let transaction = service.create_transaction(input).await?;
                    print_transaction_details("Recorded transaction", &transaction);
                }
                service.close().await;
            }

            Commands::Delete { id } => {
                let service = LedgerService::connect(&self.database).await?;
                let deleted = service.delete_transaction(id.as_deref()).await?;
                println!(
                    "Deleted transaction: {} {} ({})",
                    deleted.keterangan,
                    format_cents(deleted.jumlah),
                    deleted.id
                );
                service.close().await;
            }

            Commands::Summary { period, format } => {
                let service = LedgerService::connect(&self.database).await?;
                run_summary_command(&service, &period, &format).await?;
                service.close().await;
            }

            Commands::Balance { format } => {
                let service = LedgerService::connect(&self.database).await?;
                run_balance_command(&service, &format).await?;
                service.close().await;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
                service.close().await;
            }
        }

        Ok(())
    }
}

fn build_new_transaction(
    keterangan: String,
    jumlah: &str,
    tipe: &str,
    metode: Option<String>,
    date: Option<String>,
) -> Result<NewTransaction> {
    let amount = parse_cents(jumlah).context("Invalid amount format. Use '1000' or '1000.50'")?;

    let tipe = TransactionType::from_str(tipe).ok_or_else(|| {
        anyhow::anyhow!("Invalid type '{}'. Valid types: masuk, keluar", tipe)
    })?;

    let mut input = NewTransaction::new(keterangan, amount).with_tipe(tipe);

    if let Some(metode) = metode {
        let method = PaymentMethod::from_str(&metode).ok_or_else(|| {
            anyhow::anyhow!("Invalid method '{}'. Valid methods: online, offline", metode)
        })?;
        input = input.with_metode(method);
    }

    if let Some(date_str) = date {
        let tanggal = parse_date(&date_str).with_context(|| {
            format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
        })?;
        input = input.with_tanggal(tanggal);
    }

    Ok(input)
}

fn print_transaction_details(heading: &str, transaction: &Transaction) {
    println!("{}: {}", heading, transaction.keterangan);
    println!("  ID:           {}", transaction.id);
    println!(
        "  Date:         {}",
        transaction
            .tanggal
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Type:         {}", transaction.tipe);
    if let Some(metode) = transaction.metode {
        println!("  Method:       {}", metode);
    }
    println!("  Amount:       {}", format_cents(transaction.jumlah));
    println!("  Admin fee:    {}", format_cents(transaction.biaya_admin));
    println!("  Net:          {}", format_cents(transaction.total_bersih));
}

async fn run_list_command(
    service: &LedgerService,
    format: &str,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<()> {
    let transactions = match range {
        Some((start, end)) => service.list_transactions_between(start, end).await?,
        None => service.list_transactions().await?,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<10}  {:<24}  {:<6}  {:<7}  {:>12}  {:>10}  {:>12}",
        "ID", "DATE", "DESCRIPTION", "TYPE", "METHOD", "AMOUNT", "FEE", "NET"
    );
    println!("{}", "-".repeat(133));

    for transaction in &transactions {
        println!(
            "{:<36}  {:<10}  {:<24}  {:<6}  {:<7}  {:>12}  {:>10}  {:>12}",
            transaction.id,
            transaction.tanggal.with_timezone(&Local).format("%Y-%m-%d"),
            truncate(&transaction.keterangan, 24),
            transaction.tipe,
            transaction.metode.map(|m| m.as_str()).unwrap_or("-"),
            format_cents(transaction.jumlah),
            format_cents(transaction.biaya_admin),
            format_cents(transaction.total_bersih)
        );
    }

    Ok(())
}

async fn run_summary_command(service: &LedgerService, period: &str, format: &str) -> Result<()> {
    let period = service.resolve_period(Some(period));
    let report = service.get_summary(period).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Cash Flow Summary ({})", report.period);
            println!(
                "Since: {}",
                report
                    .period_start
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
            );
            println!();
            println!("Total in:        {:>15}", format_cents(report.total_masuk));
            println!("Total out:       {:>15}", format_cents(report.total_keluar));
            println!(
                "Admin fees:      {:>15}",
                format_cents(report.total_biaya_admin)
            );
            println!("{}", "-".repeat(33));
            println!("Difference:      {:>15}", format_cents(report.selisih));
            println!("Transactions:    {:>15}", report.jumlah_transaksi);
        }
    }

    Ok(())
}

async fn run_balance_command(service: &LedgerService, format: &str) -> Result<()> {
    let report = service.get_dashboard().await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Balance:         {:>15}", format_cents(report.saldo));
            println!("Today in:        {:>15}", format_cents(report.today_in));
            println!("Today out:       {:>15}", format_cents(report.today_out));
            println!("Transactions:    {:>15}", report.jumlah_transaksi);
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "transactions" => {
            let count = exporter.export_transactions_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} transactions",
                    snapshot.transactions.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: transactions, full",
                export_type
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse `YYYY-MM-DD` as UTC midnight, or a full RFC 3339 timestamp.
fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(naive_datetime.and_utc())
}
