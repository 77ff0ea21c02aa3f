use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Amount overflow while computing {0}")]
    AmountOverflow(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
