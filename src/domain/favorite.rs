use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Money, Payment};

pub type FavoriteId = Uuid;

/// A named snapshot of a payment that can be replayed later.
/// Favorites never change once created, even if the source payment is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub account_id: AccountId,
    pub name: String,
    pub amount: Money,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn from_payment(id: FavoriteId, payment: &Payment, name: impl Into<String>) -> Self {
        Self {
            id,
            account_id: payment.account_id,
            name: name.into(),
            amount: payment.amount,
            category: payment.category.clone(),
            created_at: Utc::now(),
        }
    }
}
