use thiserror::Error;

use crate::domain::{AccountId, FavoriteId, Money, PaymentId, PaymentStatus};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Phone already registered: {0}")]
    AccountAlreadyExists(String),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("Favorite not found: {0}")]
    FavoriteNotFound(FavoriteId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds in account {account_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Money,
        required: Money,
    },

    #[error("Payment {payment_id} is {status}, only in-progress payments can be rejected")]
    InvalidState {
        payment_id: PaymentId,
        status: PaymentStatus,
    },

    #[error("Payment {payment_id} belongs to account {account_id}, which does not exist")]
    DanglingPayment {
        payment_id: PaymentId,
        account_id: AccountId,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
