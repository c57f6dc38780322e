use std::collections::HashMap;

use anyhow::Result;

use crate::domain::{Account, AccountId, Favorite, FavoriteId, Payment, PaymentId};

/// Load/save access to the three ledger collections.
///
/// `save_*` inserts or replaces by id. Every method is fallible so a durable
/// backend can be plugged in; the in-memory one never fails.
pub trait Repository {
    /// Reserve the next sequential account id. Ids start at 1 and are never reused.
    fn next_account_id(&mut self) -> Result<AccountId>;

    fn save_account(&mut self, account: &Account) -> Result<()>;
    fn get_account(&self, id: AccountId) -> Result<Option<Account>>;
    fn get_account_by_phone(&self, phone: &str) -> Result<Option<Account>>;
    /// All accounts ordered by id.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    fn save_payment(&mut self, payment: &Payment) -> Result<()>;
    fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>>;
    /// All payments in the order they were first saved.
    fn list_payments(&self) -> Result<Vec<Payment>>;

    fn save_favorite(&mut self, favorite: &Favorite) -> Result<()>;
    fn get_favorite(&self, id: FavoriteId) -> Result<Option<Favorite>>;
    /// All favorites in the order they were first saved.
    fn list_favorites(&self) -> Result<Vec<Favorite>>;
}

/// Keyed in-memory collections. Insertion order is tracked separately so
/// listings are stable.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    last_account_id: AccountId,
    accounts: HashMap<AccountId, Account>,
    phones: HashMap<String, AccountId>,
    payments: HashMap<PaymentId, Payment>,
    payment_order: Vec<PaymentId>,
    favorites: HashMap<FavoriteId, Favorite>,
    favorite_order: Vec<FavoriteId>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for InMemoryRepository {
    fn next_account_id(&mut self) -> Result<AccountId> {
        self.last_account_id += 1;
        Ok(self.last_account_id)
    }

    fn save_account(&mut self, account: &Account) -> Result<()> {
        if let Some(previous) = self.accounts.insert(account.id, account.clone()) {
            if previous.phone != account.phone {
                self.phones.remove(&previous.phone);
            }
        }
        self.phones.insert(account.phone.clone(), account.id);
        Ok(())
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).cloned())
    }

    fn get_account_by_phone(&self, phone: &str) -> Result<Option<Account>> {
        Ok(self
            .phones
            .get(phone)
            .and_then(|id| self.accounts.get(id))
            .cloned())
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    fn save_payment(&mut self, payment: &Payment) -> Result<()> {
        if self.payments.insert(payment.id, payment.clone()).is_none() {
            self.payment_order.push(payment.id);
        }
        Ok(())
    }

    fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.payments.get(&id).cloned())
    }

    fn list_payments(&self) -> Result<Vec<Payment>> {
        Ok(self
            .payment_order
            .iter()
            .filter_map(|id| self.payments.get(id))
            .cloned()
            .collect())
    }

    fn save_favorite(&mut self, favorite: &Favorite) -> Result<()> {
        if self.favorites.insert(favorite.id, favorite.clone()).is_none() {
            self.favorite_order.push(favorite.id);
        }
        Ok(())
    }

    fn get_favorite(&self, id: FavoriteId) -> Result<Option<Favorite>> {
        Ok(self.favorites.get(&id).cloned())
    }

    fn list_favorites(&self) -> Result<Vec<Favorite>> {
        Ok(self
            .favorite_order
            .iter()
            .filter_map(|id| self.favorites.get(id))
            .cloned()
            .collect())
    }
}
