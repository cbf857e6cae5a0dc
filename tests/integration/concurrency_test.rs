// Concurrent units of work on one device or one contract must serialize

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use helpers::*;
use installment_ledger::contracts::services::ContractService;
use installment_ledger::core::AppError;
use installment_ledger::installments::models::ScheduleStatus;
use installment_ledger::modules::notifications::NotificationDispatcher;
use installment_ledger::payments::services::PaymentService;
use installment_ledger::LedgerStore;
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_purchases_of_one_device() {
    let store = seeded_store().await;
    let contracts = Arc::new(ContractService::new(
        store.clone(),
        NotificationDispatcher::disabled(),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let contracts = contracts.clone();
        handles.push(tokio::spawn(async move {
            contracts.create_contract(contract_request(PLAN_10_ID)).await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.list_contracts(50, 0).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirmations_of_one_payment() {
    let store = seeded_store().await;
    let contracts = ContractService::new(store.clone(), NotificationDispatcher::disabled());
    let payments = Arc::new(PaymentService::new(
        store.clone(),
        NotificationDispatcher::disabled(),
    ));

    let contract_id = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap()
        .contract
        .id;
    let payment_id = payments
        .create_payment(payment_request(&contract_id, dec!(88)))
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let payments = payments.clone();
        let payment_id = payment_id.clone();
        handles.push(tokio::spawn(async move {
            payments.confirm_payment(&payment_id).await
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(AppError::AlreadyCompleted(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(confirmed, 1);
    let contract = store.find_contract(&contract_id).await.unwrap().unwrap();
    assert_eq!(contract.remaining_balance, dec!(792));
    assert_balance_matches_schedule(store.as_ref(), &contract_id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_confirm_racing_delete_leaves_one_winner() {
    for round in 0..10 {
        let store = seeded_store().await;
        let contracts = Arc::new(ContractService::new(
            store.clone(),
            NotificationDispatcher::disabled(),
        ));
        let payments = Arc::new(PaymentService::new(
            store.clone(),
            NotificationDispatcher::disabled(),
        ));
        let contract_id = contracts
            .create_contract(contract_request(PLAN_10_ID))
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
            other => panic!("round {}: unexpected outcome: {:?}", round, other),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_payments_settle_distinct_entries() {
    let store = seeded_store().await;
    let contracts = ContractService::new(store.clone(), NotificationDispatcher::disabled());
    let payments = Arc::new(PaymentService::new(
        store.clone(),
        NotificationDispatcher::disabled(),
    ));

    let contract_id = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap()
        .contract
        .id;

    let mut payment_ids = Vec::new();
    for _ in 0..5 {
        payment_ids.push(
            payments
                .create_payment(payment_request(&contract_id, dec!(88)))
                .await
                .unwrap()
                .id,
        );
    }

    let handles: Vec<_> = payment_ids
        .into_iter()
        .map(|id| {
            let payments = payments.clone();
            tokio::spawn(async move { payments.confirm_payment(&id).await })
        })
        .collect();

    let mut settled_entries = Vec::new();
    for handle in handles {
        let view = handle.await.unwrap().unwrap();
        settled_entries.push(view.schedule_entry_id.unwrap());
    }
    settled_entries.sort();
    settled_entries.dedup();
    assert_eq!(settled_entries.len(), 5, "each payment settles its own entry");

    let schedule = store.find_schedule(&contract_id).await.unwrap();
    let paid: Vec<_> = schedule
        .iter()
        .filter(|e| e.status == ScheduleStatus::Paid)
        .map(|e| e.installment_number)
        .collect();
    assert_eq!(paid, vec![1, 2, 3, 4, 5]);

    let contract = store.find_contract(&contract_id).await.unwrap().unwrap();
    assert_eq!(contract.remaining_balance, dec!(440));
    assert_balance_matches_schedule(store.as_ref(), &contract_id).await;
}
