mod common;

use anyhow::Result;
use common::{PHONE, TestAccount, add_account_with_balance, test_service};
use uuid::Uuid;
use wallet_ledger::application::AppError;
use wallet_ledger::domain::PaymentStatus;

#[test]
fn test_favorite_payment_snapshots_payment() -> Result<()> {
    let mut service = test_service();
    let (account, payments) = TestAccount::standard().create(&mut service)?;

    let favorite = service.favorite_payment(payments[0].id, "my auto")?;

    assert_eq!(favorite.account_id, account.id);
    assert_eq!(favorite.amount, 1_000_00);
    assert_eq!(favorite.category, "auto");
    assert_eq!(favorite.name, "my auto");
    assert_eq!(service.find_favorite_by_id(favorite.id)?, favorite);
    Ok(())
}

#[test]
fn test_favorite_does_not_move_money() -> Result<()> {
    let mut service = test_service();
    let (account, payments) = TestAccount::standard().create(&mut service)?;

    service.favorite_payment(payments[0].id, "my auto")?;

    assert_eq!(service.find_account_by_id(account.id)?.balance, account.balance);
    assert_eq!(service.payments()?.len(), 1);
    Ok(())
}

#[test]
fn test_favorite_unknown_payment_fails() {
    let mut service = test_service();
    let err = service
        .favorite_payment(Uuid::new_v4(), "my favorite")
        .unwrap_err();
    assert!(matches!(err, AppError::PaymentNotFound(_)));
    assert!(service.favorites().unwrap().is_empty());
}

#[test]
fn test_find_unknown_favorite_fails() {
    let service = test_service();
    let missing = Uuid::new_v4();
    let err = service.find_favorite_by_id(missing).unwrap_err();
    assert!(matches!(err, AppError::FavoriteNotFound(id) if id == missing));
}

#[test]
fn test_pay_from_favorite() -> Result<()> {
    let mut service = test_service();
    let (account, payments) = TestAccount::standard().create(&mut service)?;
    let favorite = service.favorite_payment(payments[0].id, "my auto")?;

    let payment = service.pay_from_favorite(favorite.id)?;

    assert_ne!(payment.id, payments[0].id);
    assert_eq!(payment.account_id, payments[0].account_id);
    assert_eq!(payment.amount, payments[0].amount);
    assert_eq!(payment.category, payments[0].category);
    assert_eq!(payment.status, PaymentStatus::InProgress);
    assert_eq!(service.find_account_by_id(account.id)?.balance, 8_000_00);
    Ok(())
}

#[test]
fn test_pay_from_favorite_ignores_later_changes_to_payment() -> Result<()> {
    let mut service = test_service();
    let (account, payments) = TestAccount::standard().create(&mut service)?;
    let favorite = service.favorite_payment(payments[0].id, "my auto")?;

    service.reject(payments[0].id)?;
    let payment = service.pay_from_favorite(favorite.id)?;

    assert_eq!(payment.amount, 1_000_00);
    assert_eq!(payment.category, "auto");
    assert!(payment.is_in_progress());
    assert_eq!(service.find_account_by_id(account.id)?.balance, 9_000_00);
    Ok(())
}

#[test]
fn test_pay_from_favorite_insufficient_funds() -> Result<()> {
    let mut service = test_service();
    let account = add_account_with_balance(&mut service, PHONE, 100_00)?;
    let payment = service.pay(account.id, 60_00, "mobile")?;
    let favorite = service.favorite_payment(payment.id, "top up")?;

    let err = service.pay_from_favorite(favorite.id).unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientFunds {
            balance: 40_00,
            required: 60_00,
            ..
        }
    ));
    assert_eq!(service.payments()?.len(), 1);
    Ok(())
}

#[test]
fn test_pay_from_unknown_favorite_fails() {
    let mut service = test_service();
    let err = service.pay_from_favorite(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, AppError::FavoriteNotFound(_)));
}

#[test]
fn test_favorites_listed_in_creation_order() -> Result<()> {
    let mut service = test_service();
    let account = add_account_with_balance(&mut service, PHONE, 1_000_00)?;
    let auto = service.pay(account.id, 10_00, "auto")?;
    let food = service.pay(account.id, 20_00, "food")?;

    service.favorite_payment(food.id, "lunch")?;
    service.favorite_payment(auto.id, "fuel")?;
    service.favorite_payment(food.id, "dinner")?;

    let names: Vec<String> = service.favorites()?.into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["lunch", "fuel", "dinner"]);
    Ok(())
}

#[test]
fn test_ids_are_never_reused() -> Result<()> {
    let mut service = test_service();
    let (_, payments) = TestAccount::standard().create(&mut service)?;
    let favorite = service.favorite_payment(payments[0].id, "my auto")?;
    let replay = service.pay_from_favorite(favorite.id)?;
    let repeat = service.repeat(replay.id)?;

    let mut ids = vec![payments[0].id, favorite.id, replay.id, repeat.id];
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    Ok(())
}
