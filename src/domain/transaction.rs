use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, percent_of};

pub type TransactionId = Uuid;

/// Admin fee charged on outgoing online transactions, in percent of `jumlah`.
pub const ADMIN_FEE_PERCENT: i64 = 35;

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Incoming cash (revenue)
    #[default]
    Masuk,
    /// Outgoing cash (expense)
    Keluar,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Masuk => "MASUK",
            TransactionType::Keluar => "KELUAR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MASUK" => Some(TransactionType::Masuk),
            "KELUAR" => Some(TransactionType::Keluar),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Offline,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Offline => "offline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "online" => Some(PaymentMethod::Online),
            "offline" => Some(PaymentMethod::Offline),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fee for a transaction: only outgoing online transactions are charged.
pub fn compute_admin_fee(
    tipe: TransactionType,
    metode: Option<PaymentMethod>,
    jumlah: Cents,
) -> Cents {
    match (tipe, metode) {
        (TransactionType::Keluar, Some(PaymentMethod::Online)) => {
            percent_of(jumlah, ADMIN_FEE_PERCENT)
        }
        _ => 0,
    }
}

/// Net amount of a transaction.
///
/// The fee is subtracted on MASUK rows only, while it is only ever charged on
/// KELUAR rows. A KELUAR online row therefore keeps `total_bersih == jumlah`
/// and carries its fee separately in `biaya_admin`.
pub fn compute_net_amount(tipe: TransactionType, jumlah: Cents, biaya_admin: Cents) -> Cents {
    match tipe {
        TransactionType::Keluar => jumlah,
        TransactionType::Masuk => jumlah - biaya_admin,
    }
}

/// A recorded cash transaction. Transactions are immutable once stored;
/// the only lifecycle after creation is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    /// Free-form description
    pub keterangan: String,
    /// When the transaction happened
    pub tanggal: DateTime<Utc>,
    pub tipe: TransactionType,
    pub metode: Option<PaymentMethod>,
    /// Gross amount. All amounts serialize as integer cents.
    pub jumlah: Cents,
    pub biaya_admin: Cents,
    pub total_bersih: Cents,
}

impl Transaction {
    /// Build a transaction, deriving the fee and the net amount.
    /// `tanggal` is truncated to microseconds, the precision it is stored with.
    pub fn new(
        keterangan: impl Into<String>,
        tipe: TransactionType,
        metode: Option<PaymentMethod>,
        jumlah: Cents,
        tanggal: DateTime<Utc>,
    ) -> Self {
        let biaya_admin = compute_admin_fee(tipe, metode, jumlah);
        Self {
            id: Uuid::new_v4(),
            keterangan: keterangan.into(),
            tanggal: tanggal.trunc_subsecs(6),
            tipe,
            metode,
            jumlah,
            biaya_admin,
            total_bersih: compute_net_amount(tipe, jumlah, biaya_admin),
        }
    }

    pub fn is_masuk(&self) -> bool {
        self.tipe == TransactionType::Masuk
    }

    /// Signed effect of this transaction on the running balance.
    pub fn balance_delta(&self) -> Cents {
        match self.tipe {
            TransactionType::Masuk => self.jumlah - self.biaya_admin,
            TransactionType::Keluar => -self.jumlah,
        }
    }
}

/// Input for recording a transaction. Missing fields take their defaults
/// when the transaction is built: `tipe` = MASUK, `tanggal` = now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub keterangan: String,
    pub jumlah: Cents,
    #[serde(default)]
    pub tipe: Option<TransactionType>,
    #[serde(default)]
    pub metode: Option<PaymentMethod>,
    #[serde(default)]
    pub tanggal: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(keterangan: impl Into<String>, jumlah: Cents) -> Self {
        Self {
            keterangan: keterangan.into(),
            jumlah,
            ..Self::default()
        }
    }

    pub fn with_tipe(mut self, tipe: TransactionType) -> Self {
        self.tipe = Some(tipe);
        self
    }

    pub fn with_metode(mut self, metode: PaymentMethod) -> Self {
        self.metode = Some(metode);
        self
    }

    pub fn with_tanggal(mut self, tanggal: DateTime<Utc>) -> Self {
        self.tanggal = Some(tanggal);
        self
    }

    /// Resolve defaults against `now` and compute the derived amounts.
    pub fn build(self, now: DateTime<Utc>) -> Transaction {
        Transaction::new(
            self.keterangan,
            self.tipe.unwrap_or_default(),
            self.metode,
            self.jumlah,
            self.tanggal.unwrap_or(now),
        )
    }
}
