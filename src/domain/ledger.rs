use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionType};

/// Aggregate totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub total_masuk: Cents,
    pub total_keluar: Cents,
    pub total_biaya_admin: Cents,
    pub jumlah_transaksi: usize,
}

impl PeriodTotals {
    /// Difference between incoming and outgoing net amounts.
    pub fn selisih(&self) -> Cents {
        self.total_masuk - self.total_keluar
    }
}

/// Sum net amounts per direction and fees across all rows.
/// Returns `None` if any total overflows.
pub fn compute_totals(transactions: &[Transaction]) -> Option<PeriodTotals> {
    transactions
        .iter()
        .try_fold(PeriodTotals::default(), |mut acc, transaction| {
            match transaction.tipe {
                TransactionType::Masuk => {
                    acc.total_masuk = acc.total_masuk.checked_add(transaction.total_bersih)?
                }
                TransactionType::Keluar => {
                    acc.total_keluar = acc.total_keluar.checked_add(transaction.total_bersih)?
                }
            }
            acc.total_biaya_admin = acc.total_biaya_admin.checked_add(transaction.biaya_admin)?;
            acc.jumlah_transaksi += 1;
            Some(acc)
        })
}

/// Running balance plus today's movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub saldo: Cents,
    pub today_in: Cents,
    pub today_out: Cents,
}

/// Compute the balance over all transactions and the in/out totals for the
/// calendar day of `now`, in `now`'s time zone. Returns `None` on overflow.
///
/// Incoming rows count net of their fee, outgoing rows count their gross amount.
pub fn compute_dashboard<Tz: TimeZone>(
    transactions: &[Transaction],
    now: &DateTime<Tz>,
) -> Option<DashboardStats> {
    let tz = now.timezone();
    let today = now.date_naive();

    transactions
        .iter()
        .try_fold(DashboardStats::default(), |mut acc, transaction| {
            let is_today = transaction.tanggal.with_timezone(&tz).date_naive() == today;
            let delta = transaction.balance_delta();
            acc.saldo = acc.saldo.checked_add(delta)?;
            if is_today {
                if transaction.is_masuk() {
                    acc.today_in = acc.today_in.checked_add(delta)?;
                } else {
                    acc.today_out = acc.today_out.checked_sub(delta)?;
                }
            }
            Some(acc)
        })
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;
    use crate::domain::PaymentMethod;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn make(
        tipe: TransactionType,
        metode: Option<PaymentMethod>,
        jumlah: Cents,
        tanggal: &str,
    ) -> Transaction {
        Transaction::new("test", tipe, metode, jumlah, at(tanggal))
    }

    const ONLINE: Option<PaymentMethod> = Some(PaymentMethod::Online);
    const OFFLINE: Option<PaymentMethod> = Some(PaymentMethod::Offline);

    #[test]
    fn test_totals_empty() {
        let totals = compute_totals(&[]).unwrap();
        assert_eq!(totals, PeriodTotals::default());
        assert_eq!(totals.selisih(), 0);
    }

    #[test]
    fn test_totals_mixed() {
        let transactions = vec![
            make(TransactionType::Masuk, None, 500000, "2024-01-17T08:00:00Z"),
            make(TransactionType::Keluar, ONLINE, 100000, "2024-01-17T09:00:00Z"),
            make(TransactionType::Keluar, OFFLINE, 20000, "2024-01-17T10:00:00Z"),
        ];

        let totals = compute_totals(&transactions).unwrap();

        assert_eq!(totals.total_masuk, 500000);
        // KELUAR rows contribute their net amount, which equals the gross amount
        assert_eq!(totals.total_keluar, 120000);
        assert_eq!(totals.total_biaya_admin, 35000);
        assert_eq!(totals.jumlah_transaksi, 3);
        assert_eq!(totals.selisih(), 380000);
    }

    #[test]
    fn test_dashboard_balance_and_today() {
        let now = at("2024-01-17T12:00:00Z");
        let transactions = vec![
            make(TransactionType::Masuk, None, 500000, "2024-01-10T08:00:00Z"),
            make(TransactionType::Masuk, None, 70000, "2024-01-17T08:00:00Z"),
            make(TransactionType::Keluar, ONLINE, 100000, "2024-01-17T09:00:00Z"),
            make(TransactionType::Keluar, None, 30000, "2024-01-16T09:00:00Z"),
        ];

        let stats = compute_dashboard(&transactions, &now).unwrap();

        assert_eq!(stats.saldo, 500000 + 70000 - 100000 - 30000);
        assert_eq!(stats.today_in, 70000);
        assert_eq!(stats.today_out, 100000);
    }

    #[test]
    fn test_dashboard_today_follows_time_zone() {
        // 2024-01-16T20:00Z is already the 17th in UTC+7
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = at("2024-01-17T05:00:00Z").with_timezone(&jakarta);
        let transactions = vec![make(
            TransactionType::Masuk,
            None,
            1000,
            "2024-01-16T20:00:00Z",
        )];

        let stats = compute_dashboard(&transactions, &now).unwrap();

        assert_eq!(stats.today_in, 1000);
    }

    #[test]
    fn test_totals_overflow_is_reported() {
        let transactions = vec![
            make(TransactionType::Masuk, None, i64::MAX / 2 + 1, "2024-01-17T08:00:00Z"),
            make(TransactionType::Masuk, None, i64::MAX / 2 + 1, "2024-01-17T09:00:00Z"),
        ];

        assert_eq!(compute_totals(&transactions), None);
    }

    #[test]
    fn test_dashboard_overflow_is_reported() {
        let now = at("2024-01-17T12:00:00Z");
        let transactions = vec![
            make(TransactionType::Keluar, None, i64::MAX, "2024-01-10T08:00:00Z"),
            make(TransactionType::Keluar, None, i64::MAX, "2024-01-11T08:00:00Z"),
        ];

        assert_eq!(compute_dashboard(&transactions, &now), None);
    }
}
