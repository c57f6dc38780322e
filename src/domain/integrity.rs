use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{Account, AccountId, Favorite, Money, MoneyTotal, Payment};

/// Result of checking the ledger's invariants against its current contents.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub account_count: usize,
    pub payment_count: usize,
    pub favorite_count: usize,
    /// Sum of all account balances
    pub total_balance: MoneyTotal,
    /// Sum of payments that can still be rejected
    pub in_progress_amount: MoneyTotal,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn build_integrity_report(
    accounts: &[Account],
    payments: &[Payment],
    favorites: &[Favorite],
) -> IntegrityReport {
    let mut issues = Vec::new();
    let known: HashSet<AccountId> = accounts.iter().map(|a| a.id).collect();

    let mut phones: HashMap<&str, AccountId> = HashMap::new();
    for account in accounts {
        if account.balance < 0 {
            issues.push(format!(
                "Account {} has a negative balance ({})",
                account.id, account.balance
            ));
        }
        if let Some(first) = phones.insert(&account.phone, account.id) {
            issues.push(format!(
                "Phone {} is registered to accounts {} and {}",
                account.phone, first, account.id
            ));
        }
    }

    for payment in payments {
        if !known.contains(&payment.account_id) {
            issues.push(format!(
                "Payment {} references unknown account {}",
                payment.id, payment.account_id
            ));
        }
        if payment.amount <= 0 {
            issues.push(format!(
                "Payment {} has a non-positive amount ({})",
                payment.id, payment.amount
            ));
        }
    }

    for favorite in favorites {
        if !known.contains(&favorite.account_id) {
            issues.push(format!(
                "Favorite {} references unknown account {}",
                favorite.id, favorite.account_id
            ));
        }
        if favorite.amount <= 0 {
            issues.push(format!(
                "Favorite {} has a non-positive amount ({})",
                favorite.id, favorite.amount
            ));
        }
    }

    IntegrityReport {
        account_count: accounts.len(),
        payment_count: payments.len(),
        favorite_count: favorites.len(),
        total_balance: accounts.iter().map(|a| MoneyTotal::from(a.balance)).sum(),
        in_progress_amount: payments
            .iter()
            .filter(|p| p.is_in_progress())
            .map(|p| MoneyTotal::from(p.amount))
            .sum(),
        issues,
    }
}
