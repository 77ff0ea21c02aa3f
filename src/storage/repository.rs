use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{PaymentMethod, Transaction, TransactionId, TransactionType};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str =
    "id, keterangan, tanggal, tipe, metode, jumlah, biaya_admin, total_bersih";

/// Repository for persisting and querying cash-flow transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        debug!("Connecting to {}", database_url);
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the underlying pool, waiting for open connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Save a new transaction.
    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        debug!("Inserting transaction {}", transaction.id);
        sqlx::query(
            r#"
            INSERT INTO transactions (id, keterangan, tanggal, tipe, metode, jumlah, biaya_admin, total_bersih)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(&transaction.keterangan)
        .bind(encode_timestamp(&transaction.tanggal))
        .bind(transaction.tipe.as_str())
        .bind(transaction.metode.map(|m| m.as_str()))
        .bind(transaction.jumlah)
        .bind(transaction.biaya_admin)
        .bind(transaction.total_bersih)
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// List all transactions, newest `tanggal` first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        debug!("Listing all transactions");
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY tanggal DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List transactions dated at or after `start`, with no upper bound.
    pub async fn list_transactions_since(&self, start: DateTime<Utc>) -> Result<Vec<Transaction>> {
        debug!("Listing transactions since {}", start);
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE tanggal >= ? ORDER BY tanggal DESC, rowid DESC"
        ))
        .bind(encode_timestamp(&start))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions since date")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List transactions dated in `[start, end)`.
    pub async fn list_transactions_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        debug!("Listing transactions in [{}, {})", start, end);
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE tanggal >= ? AND tanggal < ? ORDER BY tanggal DESC, rowid DESC"
        ))
        .bind(encode_timestamp(&start))
        .bind(encode_timestamp(&end))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions in range")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Delete a transaction and return it, or `None` if no row matched.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        debug!("Deleting transaction {}", id);
        let row = sqlx::query(&format!(
            "DELETE FROM transactions WHERE id = ? RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let tanggal_str: String = row.get("tanggal");
        let tipe_str: String = row.get("tipe");
        let metode_str: Option<String> = row.get("metode");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            keterangan: row.get("keterangan"),
            tanggal: DateTime::parse_from_rfc3339(&tanggal_str)
                .context("Invalid tanggal timestamp")?
                .with_timezone(&Utc),
            tipe: TransactionType::from_str(&tipe_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", tipe_str))?,
            metode: metode_str
                .map(|s| {
                    PaymentMethod::from_str(&s)
                        .ok_or_else(|| anyhow::anyhow!("Invalid payment method: {}", s))
                })
                .transpose()?,
            jumlah: row.get("jumlah"),
            biaya_admin: row.get("biaya_admin"),
            total_bersih: row.get("total_bersih"),
        })
    }
}

/// Fixed-width UTC encoding; text comparison in SQL matches time order.
fn encode_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
