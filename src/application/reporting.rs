use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, DashboardStats, Period, PeriodTotals};

/// Totals for all transactions dated on or after the start of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub period: Period,
    pub period_start: DateTime<Utc>,
    pub total_masuk: Cents,
    pub total_keluar: Cents,
    pub total_biaya_admin: Cents,
    pub selisih: Cents,
    pub jumlah_transaksi: usize,
}

impl SummaryReport {
    pub fn new(period: Period, period_start: DateTime<Utc>, totals: PeriodTotals) -> Self {
        Self {
            period,
            period_start,
            total_masuk: totals.total_masuk,
            total_keluar: totals.total_keluar,
            total_biaya_admin: totals.total_biaya_admin,
            selisih: totals.selisih(),
            jumlah_transaksi: totals.jumlah_transaksi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub as_of: DateTime<Utc>,
    pub saldo: Cents,
    pub today_in: Cents,
    pub today_out: Cents,
    pub jumlah_transaksi: usize,
}

impl DashboardReport {
    pub fn new(as_of: DateTime<Utc>, stats: DashboardStats, jumlah_transaksi: usize) -> Self {
        Self {
            as_of,
            saldo: stats.saldo,
            today_in: stats.today_in,
            today_out: stats.today_out,
            jumlah_transaksi,
        }
    }
}
