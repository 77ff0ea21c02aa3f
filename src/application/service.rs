use chrono::{DateTime, Local, TimeZone, Utc};
use log::{info, warn};
use uuid::Uuid;

use crate::domain::{
    compute_dashboard, compute_totals, format_cents, NewTransaction, Period, Transaction,
};
use crate::storage::Repository;

use super::{AppError, DashboardReport, SummaryReport};

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release the database handle.
    pub async fn close(self) {
        self.repo.close().await;
    }

    // ========================
    // Transaction operations
    // ========================

    /// List all transactions, newest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    /// List transactions dated in `[start, end)`, newest first.
    pub async fn list_transactions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, AppError> {
        if start > end {
            return Err(AppError::Validation(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(self.repo.list_transactions_in_range(start, end).await?)
    }

    /// Compute what a transaction would look like without storing it.
    pub fn preview_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        validate_new_transaction(&input)?;
        Ok(input.build(Utc::now()))
    }

    /// Record a new transaction. Fee and net amount are derived from the input.
    pub async fn create_transaction(
        &self,
        input: NewTransaction,
    ) -> Result<Transaction, AppError> {
        validate_new_transaction(&input)?;

        let transaction = input.build(Utc::now());
        self.repo.save_transaction(&transaction).await?;

        info!(
            "Recorded {} {} ({}), fee {}",
            transaction.tipe,
            format_cents(transaction.jumlah),
            transaction.id,
            format_cents(transaction.biaya_admin)
        );
        Ok(transaction)
    }

    /// Delete a transaction by ID and return it.
    ///
    /// The ID is required; a missing one is rejected before the store is touched.
    pub async fn delete_transaction(&self, id: Option<&str>) -> Result<Transaction, AppError> {
        let id = id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("transaction ID is required".to_string()))?;

        // An ID that is not a UUID cannot match any stored row
        let transaction_id =
            Uuid::parse_str(id).map_err(|_| AppError::TransactionNotFound(id.to_string()))?;

        let deleted = self
            .repo
            .delete_transaction(transaction_id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))?;

        info!("Deleted transaction {}", deleted.id);
        Ok(deleted)
    }

    // ========================
    // Summary operations
    // ========================

    /// Parse a period selector from a client, falling back to daily.
    pub fn resolve_period(&self, selector: Option<&str>) -> Period {
        match selector {
            None => Period::default(),
            Some(s) => Period::from_str(s).unwrap_or_else(|| {
                warn!("Unknown period '{}', using {}", s, Period::default());
                Period::default()
            }),
        }
    }

    /// Summary for the current period in the local time zone.
    pub async fn get_summary(&self, period: Period) -> Result<SummaryReport, AppError> {
        self.get_summary_at(period, &Local::now()).await
    }

    /// Summary of every transaction dated on or after the start of `period`
    /// as seen from `now`. Future-dated transactions are included.
    pub async fn get_summary_at<Tz: TimeZone>(
        &self,
        period: Period,
        now: &DateTime<Tz>,
    ) -> Result<SummaryReport, AppError> {
        let period_start = period.start(now);
        let transactions = self.repo.list_transactions_since(period_start).await?;
        let totals = compute_totals(&transactions).ok_or_else(|| {
            AppError::AmountOverflow(format!("{} summary totals", period))
        })?;

        Ok(SummaryReport::new(period, period_start, totals))
    }

    /// Running balance and today's movements in the local time zone.
    pub async fn get_dashboard(&self) -> Result<DashboardReport, AppError> {
        self.get_dashboard_at(&Local::now()).await
    }

    pub async fn get_dashboard_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<DashboardReport, AppError> {
        let transactions = self.repo.list_transactions().await?;
        let stats = compute_dashboard(&transactions, now)
            .ok_or_else(|| AppError::AmountOverflow("dashboard balance".to_string()))?;

        Ok(DashboardReport::new(
            now.with_timezone(&Utc),
            stats,
            transactions.len(),
        ))
    }
}

fn validate_new_transaction(input: &NewTransaction) -> Result<(), AppError> {
    if input.keterangan.is_empty() {
        return Err(AppError::Validation("keterangan is required".to_string()));
    }
    if input.jumlah < 0 {
        return Err(AppError::InvalidAmount(
            "Amount must not be negative".to_string(),
        ));
    }
    Ok(())
}
