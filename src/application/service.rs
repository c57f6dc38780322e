use crate::domain::{
    build_integrity_report, Account, AccountId, Favorite, FavoriteId, IdGenerator,
    IntegrityReport, Money, Payment, PaymentId, RandomIds,
};
use crate::storage::{InMemoryRepository, Repository};

use super::AppError;

/// Application service owning all accounts, payments and favorites.
/// This is the primary interface for any client (CLI, API, tests).
///
/// Mutating operations take `&mut self`; callers sharing a service across
/// threads must provide their own lock around it.
pub struct LedgerService<R = InMemoryRepository, G = RandomIds> {
    repo: R,
    ids: G,
}

impl LedgerService {
    /// Create an empty in-memory ledger with random payment/favorite ids.
    pub fn new() -> Self {
        Self::with_parts(InMemoryRepository::new(), RandomIds)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> LedgerService<InMemoryRepository, G> {
    /// Create an empty in-memory ledger drawing ids from `ids`.
    pub fn with_ids(ids: G) -> Self {
        Self::with_parts(InMemoryRepository::new(), ids)
    }
}

impl<R: Repository, G: IdGenerator> LedgerService<R, G> {
    pub fn with_parts(repo: R, ids: G) -> Self {
        Self { repo, ids }
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new account for `phone` with a zero balance.
    pub fn register_account(&mut self, phone: impl Into<String>) -> Result<Account, AppError> {
        let phone = phone.into();
        if self.repo.get_account_by_phone(&phone)?.is_some() {
            return Err(AppError::AccountAlreadyExists(phone));
        }

        let account = Account::new(self.repo.next_account_id()?, phone);
        self.repo.save_account(&account)?;
        Ok(account)
    }

    pub fn find_account_by_id(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)?
            .ok_or(AppError::AccountNotFound(id))
    }

    /// All accounts, ordered by id.
    pub fn accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts()?)
    }

    /// Add `amount` to an account's balance.
    pub fn deposit(&mut self, account_id: AccountId, amount: Money) -> Result<(), AppError> {
        let mut account = self.find_account_by_id(account_id)?;
        validate_amount(amount)?;

        if !account.credit(amount) {
            return Err(AppError::InvalidAmount(format!(
                "depositing {} would overflow the balance of account {}",
                amount, account_id
            )));
        }

        self.repo.save_account(&account)?;
        Ok(())
    }

    // ========================
    // Payment operations
    // ========================

    /// Debit an account and record an in-progress payment for `category`.
    pub fn pay(
        &mut self,
        account_id: AccountId,
        amount: Money,
        category: impl Into<String>,
    ) -> Result<Payment, AppError> {
        let mut account = self.find_account_by_id(account_id)?;
        validate_amount(amount)?;

        let previous = account.clone();
        if !account.debit(amount) {
            return Err(AppError::InsufficientFunds {
                account_id,
                balance: account.balance,
                required: amount,
            });
        }

        let payment = Payment::new(self.ids.next_id(), account_id, amount, category);
        self.save_account_then_payment(&previous, &account, &payment)?;
        Ok(payment)
    }

    pub fn find_payment_by_id(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get_payment(id)?
            .ok_or(AppError::PaymentNotFound(id))
    }

    /// All payments, oldest first.
    pub fn payments(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.repo.list_payments()?)
    }

    /// Payments made from one account, oldest first.
    pub fn payments_for_account(&self, account_id: AccountId) -> Result<Vec<Payment>, AppError> {
        self.find_account_by_id(account_id)?;
        Ok(self
            .repo
            .list_payments()?
            .into_iter()
            .filter(|p| p.account_id == account_id)
            .collect())
    }

    /// Reject an in-progress payment and refund its amount to the account.
    ///
    /// Nothing is written unless every check passes, so a second reject of the
    /// same payment fails without refunding again. The refund is written before
    /// the status change, so a failed write leaves the payment rejectable.
    pub fn reject(&mut self, payment_id: PaymentId) -> Result<(), AppError> {
        let mut payment = self.find_payment_by_id(payment_id)?;
        payment
            .reject()
            .map_err(|err| AppError::InvalidState {
                payment_id,
                status: err.from,
            })?;

        let mut account =
            self.repo
                .get_account(payment.account_id)?
                .ok_or(AppError::DanglingPayment {
                    payment_id,
                    account_id: payment.account_id,
                })?;

        let previous = account.clone();
        if !account.credit(payment.amount) {
            return Err(AppError::InvalidAmount(format!(
                "refunding {} would overflow the balance of account {}",
                payment.amount, account.id
            )));
        }

        self.save_account_then_payment(&previous, &account, &payment)
    }

    /// Make a new payment with the same account, amount and category as an
    /// existing one. Balance is checked again.
    pub fn repeat(&mut self, payment_id: PaymentId) -> Result<Payment, AppError> {
        let original = self.find_payment_by_id(payment_id)?;
        self.pay(original.account_id, original.amount, original.category)
    }

    // ========================
    // Favorite operations
    // ========================

    /// Bookmark a payment under a display name.
    pub fn favorite_payment(
        &mut self,
        payment_id: PaymentId,
        name: impl Into<String>,
    ) -> Result<Favorite, AppError> {
        let payment = self.find_payment_by_id(payment_id)?;
        let favorite = Favorite::from_payment(self.ids.next_id(), &payment, name);
        self.repo.save_favorite(&favorite)?;
        Ok(favorite)
    }

    pub fn find_favorite_by_id(&self, id: FavoriteId) -> Result<Favorite, AppError> {
        self.repo
            .get_favorite(id)?
            .ok_or(AppError::FavoriteNotFound(id))
    }

    /// All favorites, oldest first.
    pub fn favorites(&self) -> Result<Vec<Favorite>, AppError> {
        Ok(self.repo.list_favorites()?)
    }

    /// Make a new payment from a favorite's snapshot.
    pub fn pay_from_favorite(&mut self, favorite_id: FavoriteId) -> Result<Payment, AppError> {
        let favorite = self.find_favorite_by_id(favorite_id)?;
        self.pay(favorite.account_id, favorite.amount, favorite.category)
    }

    /// Write a balance change and the payment it belongs to. If the payment write
    /// fails the account is put back to `previous`.
    fn save_account_then_payment(
        &mut self,
        previous: &Account,
        account: &Account,
        payment: &Payment,
    ) -> Result<(), AppError> {
        self.repo.save_account(account)?;

        if let Err(err) = self.repo.save_payment(payment) {
            if let Err(restore_err) = self.repo.save_account(previous) {
                return Err(AppError::Storage(restore_err.context(format!(
                    "failed to restore account {} after: {:#}",
                    previous.id, err
                ))));
            }
            return Err(AppError::Storage(err));
        }
        Ok(())
    }

    // ========================
    // Integrity operations
    // ========================

    /// Check ledger invariants and return a report.
    pub fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let accounts = self.repo.list_accounts()?;
        let payments = self.repo.list_payments()?;
        let favorites = self.repo.list_favorites()?;
        Ok(build_integrity_report(&accounts, &payments, &favorites))
    }
}

fn validate_amount(amount: Money) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}
