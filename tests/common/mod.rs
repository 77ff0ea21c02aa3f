// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use aruskas::application::LedgerService;
use aruskas::domain::{Cents, NewTransaction, PaymentMethod, Transaction, TransactionType};
use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc> at midnight
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Helper to parse an RFC 3339 timestamp into DateTime<Utc>
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Record an incoming transaction at the given time
pub async fn record_masuk(
    service: &LedgerService,
    keterangan: &str,
    jumlah: Cents,
    tanggal: DateTime<Utc>,
) -> Result<Transaction> {
    Ok(service
        .create_transaction(
            NewTransaction::new(keterangan, jumlah)
                .with_tipe(TransactionType::Masuk)
                .with_tanggal(tanggal),
        )
        .await?)
}

/// Record an outgoing transaction at the given time
pub async fn record_keluar(
    service: &LedgerService,
    keterangan: &str,
    jumlah: Cents,
    metode: PaymentMethod,
    tanggal: DateTime<Utc>,
) -> Result<Transaction> {
    Ok(service
        .create_transaction(
            NewTransaction::new(keterangan, jumlah)
                .with_tipe(TransactionType::Keluar)
                .with_metode(metode)
                .with_tanggal(tanggal),
        )
        .await?)
}
