// Ledger flows against a real MySQL database
//
// Run with: TEST_DATABASE_URL=mysql://... cargo test --test mysql_ledger_test -- --ignored

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use helpers::*;
use installment_ledger::contracts::models::CreateContractRequest;
use installment_ledger::contracts::services::ContractService;
use installment_ledger::core::AppError;
use installment_ledger::modules::notifications::NotificationDispatcher;
use installment_ledger::payments::models::PaymentStatus;
use installment_ledger::payments::services::PaymentService;
use installment_ledger::{LedgerStore, MySqlLedgerStore};
use rust_decimal_macros::dec;

fn request(refs: &SeededRefs) -> CreateContractRequest {
    CreateContractRequest {
        buyer_id: refs.buyer_id.clone(),
        device_id: refs.device_id.clone(),
        plan_id: refs.plan_id.clone(),
        admin_id: None,
        trade_in: None,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 31),
    }
}

#[tokio::test]
#[ignore]
async fn test_mysql_contract_and_payment_flow() {
    let pool = create_test_pool().await;
    let refs = seed_references(&pool, dec!(1000), 10, dec!(10)).await;
    let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(pool.clone()));
    let contracts = ContractService::new(store.clone(), NotificationDispatcher::disabled());
    let payments = PaymentService::new(store.clone(), NotificationDispatcher::disabled());

    let summary = contracts.create_contract(request(&refs)).await.unwrap();
    let contract_id = summary.contract.id.clone();
    assert_eq!(device_status(&pool, &refs.device_id).await, "sold");

    let schedule = store.find_schedule(&contract_id).await.unwrap();
    assert_eq!(schedule.len(), 10);
    assert_eq!(schedule[0].due_date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

    let payment = payments
        .create_payment(payment_request(&contract_id, dec!(88)))
        .await
        .unwrap();
    let confirmed = payments.confirm_payment(&payment.id).await.unwrap();
    assert_eq!(confirmed.status, PaymentStatus::Paid);
    assert_eq!(confirmed.schedule_entry_id.as_deref(), Some(schedule[0].id.as_str()));

    let contract = store.find_contract(&contract_id).await.unwrap().unwrap();
    assert_eq!(contract.remaining_balance, dec!(792));
    assert_balance_matches_schedule(store.as_ref(), &contract_id).await;

    let err = payments.confirm_payment(&payment.id).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyCompleted(_)));

    let err = contracts.delete_contract(&contract_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore]
async fn test_mysql_rollback_keeps_device_available() {
    let pool = create_test_pool().await;
    let refs = seed_references(&pool, dec!(1000), 10, dec!(10)).await;
    let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(pool.clone()));

    let mut tx = store.begin().await.unwrap();
    ContractService::create_contract_with_tx(tx.as_mut(), request(&refs))
        .await
        .unwrap();
    // Dropped without commit
    drop(tx);

    assert_eq!(device_status(&pool, &refs.device_id).await, "available");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts WHERE device_id = ?")
        .bind(&refs.device_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_mysql_concurrent_purchase_of_one_device() {
    let pool = create_test_pool().await;
    let refs = seed_references(&pool, dec!(1000), 10, dec!(10)).await;
    let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(pool.clone()));
    let contracts = Arc::new(ContractService::new(store, NotificationDispatcher::disabled()));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let contracts = contracts.clone();
            let request = request(&refs);
            tokio::spawn(async move { contracts.create_contract(request).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(device_status(&pool, &refs.device_id).await, "sold");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_mysql_confirm_racing_delete_does_not_deadlock() {
    let pool = create_test_pool().await;
    let refs = seed_references(&pool, dec!(1000), 10, dec!(10)).await;
    let store: Arc<dyn LedgerStore> = Arc::new(MySqlLedgerStore::new(pool.clone()));
    let contracts = Arc::new(ContractService::new(
        store.clone(),
        NotificationDispatcher::disabled(),
    ));
    let payments = Arc::new(PaymentService::new(
        store.clone(),
        NotificationDispatcher::disabled(),
    ));

    let contract_id = contracts
        .create_contract(request(&refs))
        .await
        .unwrap()
        .contract
        .id;
    let payment_id = payments
        .create_payment(payment_request(&contract_id, dec!(88)))
        .await
        .unwrap()
        .id;

    let confirm = {
        let payments = payments.clone();
        tokio::spawn(async move { payments.confirm_payment(&payment_id).await })
    };
    let delete = {
        let contracts = contracts.clone();
        let contract_id = contract_id.clone();
        tokio::spawn(async move { contracts.delete_contract(&contract_id).await })
    };

    match (confirm.await.unwrap(), delete.await.unwrap()) {
        (Ok(_), Err(AppError::Conflict(_))) => {
            let contract = store.find_contract(&contract_id).await.unwrap().unwrap();
            assert_eq!(contract.remaining_balance, dec!(792));
            assert_balance_matches_schedule(store.as_ref(), &contract_id).await;
        }
        (Err(AppError::NotFound(_)), Ok(())) => {
            assert!(store.find_contract(&contract_id).await.unwrap().is_none());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
