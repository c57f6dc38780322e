// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use wallet_ledger::application::LedgerService;
use wallet_ledger::domain::{Account, Money, Payment, SequentialIds};
use wallet_ledger::storage::InMemoryRepository;

pub type TestService = LedgerService<InMemoryRepository, SequentialIds>;

pub const PHONE: &str = "+992000000001";

/// Helper to create an empty service with predictable payment/favorite ids
pub fn test_service() -> TestService {
    LedgerService::with_ids(SequentialIds::new())
}

/// Register an account and fund it
pub fn add_account_with_balance(
    service: &mut TestService,
    phone: &str,
    balance: Money,
) -> Result<Account> {
    let account = service.register_account(phone)?;
    service.deposit(account.id, balance)?;
    Ok(service.find_account_by_id(account.id)?)
}

/// Test fixture: account description with payments to make after funding
pub struct TestAccount {
    pub phone: &'static str,
    pub balance: Money,
    pub payments: Vec<(Money, &'static str)>,
}

impl TestAccount {
    /// 10000.00 on +992000000001 with a single 1000.00 "auto" payment
    pub fn standard() -> Self {
        Self {
            phone: PHONE,
            balance: 10_000_00,
            payments: vec![(1_000_00, "auto")],
        }
    }

    pub fn create(&self, service: &mut TestService) -> Result<(Account, Vec<Payment>)> {
        let account = add_account_with_balance(service, self.phone, self.balance)?;
        let mut payments = Vec::with_capacity(self.payments.len());
        for (amount, category) in &self.payments {
            payments.push(service.pay(account.id, *amount, *category)?);
        }
        let account = service.find_account_by_id(account.id)?;
        Ok((account, payments))
    }
}
