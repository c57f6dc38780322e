use serde::{Deserialize, Serialize};

use super::Money;

/// Accounts are numbered sequentially from 1 by the repository.
pub type AccountId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Phone number the account is registered to, unique across accounts
    pub phone: String,
    /// Available balance in minor units, never negative
    pub balance: Money,
}

impl Account {
    pub fn new(id: AccountId, phone: impl Into<String>) -> Self {
        Self {
            id,
            phone: phone.into(),
            balance: 0,
        }
    }

    fn can_cover(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    /// Add funds. Returns false (leaving the balance untouched) on overflow.
    pub fn credit(&mut self, amount: Money) -> bool {
        match self.balance.checked_add(amount) {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }

    /// Remove funds. Returns false (leaving the balance untouched) if the
    /// balance cannot cover the amount.
    pub fn debit(&mut self, amount: Money) -> bool {
        if !self.can_cover(amount) {
            return false;
        }
        self.balance -= amount;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_starts_empty() {
        let account = Account::new(1, "+992000000001");
        assert_eq!(account.id, 1);
        assert_eq!(account.phone, "+992000000001");
        assert_eq!(account.balance, 0);
    }

    #[test]
    fn test_debit_requires_sufficient_balance() {
        let mut account = Account::new(1, "+992000000001");
        assert!(account.credit(500));

        assert!(!account.debit(501));
        assert_eq!(account.balance, 500);

        assert!(account.debit(500));
        assert_eq!(account.balance, 0);
    }

    #[test]
    fn test_credit_overflow_leaves_balance() {
        let mut account = Account::new(1, "+992000000001");
        assert!(account.credit(Money::MAX));
        assert!(!account.credit(1));
        assert_eq!(account.balance, Money::MAX);
    }
}
