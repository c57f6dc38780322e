use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{AccountId, Money};

pub type PaymentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds have left the account, the payment can still be rejected
    InProgress,
    /// Settled. No operation produces this status yet.
    Completed,
    /// Refunded to the account. Terminal.
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::InProgress => "in_progress",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in_progress" => Some(PaymentStatus::InProgress),
            "completed" => Some(PaymentStatus::Completed),
            "rejected" => Some(PaymentStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot move payment from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

/// A payment debits an account for a category. The amount is always positive;
/// only the status changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub account_id: AccountId,
    pub amount: Money,
    pub category: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: PaymentId,
        account_id: AccountId,
        amount: Money,
        category: impl Into<String>,
    ) -> Self {
        assert!(amount > 0, "Payment amount must be positive");
        Self {
            id,
            account_id,
            amount,
            category: category.into(),
            status: PaymentStatus::InProgress,
            created_at: Utc::now(),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == PaymentStatus::InProgress
    }

    /// Move an in-progress payment to rejected. Any other starting status is an error
    /// and leaves the payment unchanged.
    pub fn reject(&mut self) -> Result<(), StatusTransitionError> {
        if !self.is_in_progress() {
            return Err(StatusTransitionError {
                from: self.status,
                to: PaymentStatus::Rejected,
            });
        }
        self.status = PaymentStatus::Rejected;
        Ok(())
    }
}
