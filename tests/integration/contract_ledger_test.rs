// Contract creation, update and deletion against the in-memory ledger
//
// Covers pricing persisted on the contract, schedule generation, the down
// payment record, device sale, typed reference errors, rollback on failure
// and post-commit notifications.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use helpers::*;
use installment_ledger::contracts::models::{ContractPatch, ContractStatus};
use installment_ledger::contracts::services::ContractService;
use installment_ledger::core::AppError;
use installment_ledger::modules::devices::models::DeviceStatus;
use installment_ledger::modules::notifications::{NotificationDispatcher, NotificationSink};
use installment_ledger::payments::models::PaymentStatus;
use installment_ledger::payments::services::PaymentService;
use installment_ledger::LedgerStore;
use rust_decimal_macros::dec;

fn service(store: Arc<dyn LedgerStore>) -> ContractService {
    ContractService::new(store, NotificationDispatcher::disabled())
}

#[tokio::test]
async fn test_create_contract_persists_pricing_and_schedule() {
    let store = seeded_store().await;
    let contracts = service(store.clone());

    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();

    assert_eq!(money(&summary.adjusted_price), dec!(1000));
    assert_eq!(money(&summary.contract.total_price), dec!(1100));
    assert_eq!(money(&summary.contract.initial_payment), dec!(220));
    assert_eq!(money(&summary.contract.monthly_payment), dec!(88));
    assert_eq!(money(&summary.contract.remaining_balance), dec!(880));
    assert_eq!(summary.contract.status, "active");
    assert_eq!(summary.contract.duration_months, 10);
    assert_eq!(summary.contract.end_date, "2025-11-15");
    assert!(summary.contract.contract_number.starts_with("CTR-20250115-"));

    let stored = store
        .find_contract(&summary.contract.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.remaining_balance, dec!(880));
    assert_eq!(stored.status, ContractStatus::Active);

    let schedule = store.find_schedule(&stored.id).await.unwrap();
    assert_eq!(schedule.len(), 10);
    assert_eq!(
        schedule[0].due_date,
        NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
    );
    assert!(schedule.iter().all(|e| e.is_pending()));
    assert_balance_matches_schedule(store.as_ref(), &stored.id).await;

    let device = store.find_device(DEVICE_ID).await.unwrap();
    assert_eq!(device.status, DeviceStatus::Sold);
}

#[tokio::test]
async fn test_down_payment_is_recorded_as_paid() {
    let store = seeded_store().await;
    let contracts = service(store.clone());

    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();

    let payment_id = summary.initial_payment_id.expect("down payment recorded");
    let payment = store.find_payment(&payment_id).await.unwrap().unwrap();
    assert_eq!(payment.amount, dec!(220));
    assert_eq!(payment.status, PaymentStatus::Paid);
    // The down payment is not an installment
    assert!(payment.schedule_entry_id.is_none());
}

#[tokio::test]
async fn test_trade_in_contract_has_no_down_payment() {
    let store = seeded_store().await;
    let contracts = service(store.clone());

    let summary = contracts
        .create_contract(trade_in_request(PLAN_5_ID, dec!(300)))
        .await
        .unwrap();

    assert!(summary.initial_payment_id.is_none());
    assert!(summary.contract.is_trade_in);
    assert_eq!(money(&summary.adjusted_price), dec!(700));
    assert_eq!(money(&summary.contract.initial_payment), dec!(0));
    assert_eq!(money(&summary.contract.monthly_payment), dec!(140));
    assert_eq!(money(&summary.contract.trade_in_value), dec!(300));

    let payments = store
        .find_payments_by_contract(&summary.contract.id)
        .await
        .unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn test_uneven_balance_puts_residue_on_last_entry() {
    let store = seeded_store().await;
    add_device(&store, "device-odd", dec!(999.99)).await;
    let contracts = service(store.clone());

    let mut request = contract_request(PLAN_10_ID);
    request.device_id = "device-odd".to_string();
    let summary = contracts.create_contract(request).await.unwrap();

    // 999.99 * 1.10 = 1099.989 -> 1099.99; down 220.00; balance 879.99
    assert_eq!(money(&summary.contract.total_price), dec!(1099.99));
    assert_eq!(money(&summary.contract.remaining_balance), dec!(879.99));
    assert_eq!(money(&summary.contract.monthly_payment), dec!(87.99));

    let amounts: Vec<_> = summary
        .schedule
        .iter()
        .map(|e| money(&e.amount_due))
        .collect();
    assert!(amounts[..9].iter().all(|a| *a == dec!(87.99)));
    assert_eq!(amounts[9], dec!(88.08));
    assert_balance_matches_schedule(store.as_ref(), &summary.contract.id).await;
}

#[tokio::test]
async fn test_unknown_references_fail_with_entity_name() {
    let store = seeded_store().await;
    let contracts = service(store.clone());

    let cases = [
        ("Buyer", {
            let mut r = contract_request(PLAN_10_ID);
            r.buyer_id = "ghost".to_string();
            r
        }),
        ("Admin", {
            let mut r = contract_request(PLAN_10_ID);
            r.admin_id = Some("ghost".to_string());
            r
        }),
        ("Plan", contract_request("ghost")),
        ("Device", {
            let mut r = contract_request(PLAN_10_ID);
            r.device_id = "ghost".to_string();
            r
        }),
    ];

    for (expected, request) in cases {
        match contracts.create_contract(request).await {
            Err(AppError::ReferenceNotFound { entity, id }) => {
                assert_eq!(entity, expected);
                assert_eq!(id, "ghost");
            }
            other => panic!("expected {} reference error, got {:?}", expected, other),
        }
    }

    assert!(store.list_contracts(10, 0).await.unwrap().is_empty());
    let device = store.find_device(DEVICE_ID).await.unwrap();
    assert_eq!(device.status, DeviceStatus::Available);
}

#[tokio::test]
async fn test_device_without_price_is_invalid_pricing_input() {
    let store = seeded_store().await;
    let mut device = installment_ledger::modules::devices::models::Device::new(
        "device-unpriced",
        "Prototype",
        dec!(0),
    );
    device.base_price = None;
    store.insert_device(device).await;
    let contracts = service(store.clone());

    let mut request = contract_request(PLAN_10_ID);
    request.device_id = "device-unpriced".to_string();
    let err = contracts.create_contract(request).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidPricingInput(_)));
    let device = store.find_device("device-unpriced").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Available);
}

#[tokio::test]
async fn test_second_sale_of_device_is_conflict() {
    let store = seeded_store().await;
    let contracts = service(store.clone());

    contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();
    let err = contracts
        .create_contract(contract_request(PLAN_5_ID))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(store.list_contracts(10, 0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_mid_creation_rolls_back_everything() {
    let fail_points = [
        FailPoint::InsertContract,
        FailPoint::InsertScheduleEntries,
        FailPoint::InsertPayment,
        FailPoint::UpdateDeviceStatus,
        FailPoint::Commit,
    ];

    for point in fail_points {
        let inner = seeded_store().await;
        let failing: Arc<dyn LedgerStore> =
            Arc::new(FailingLedgerStore::new(inner.clone(), point));
        let contracts = service(failing);

        let result = contracts.create_contract(contract_request(PLAN_10_ID)).await;
        assert!(result.is_err(), "{:?} should abort creation", point);

        assert!(
            inner.list_contracts(10, 0).await.unwrap().is_empty(),
            "no contract may survive {:?}",
            point
        );
        assert!(inner
            .find_payments_by_buyer(BUYER_ID, None)
            .await
            .unwrap()
            .is_empty());
        let device = inner.find_device(DEVICE_ID).await.unwrap();
        assert_eq!(
            device.status,
            DeviceStatus::Available,
            "device must stay available after {:?}",
            point
        );
    }
}

#[tokio::test]
async fn test_creation_notifies_buyer_and_admin() {
    let store = seeded_store().await;
    let sink = RecordingSink::new();
    let contracts = ContractService::new(
        store.clone(),
        NotificationDispatcher::new(Arc::new(sink.clone())),
    );

    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();

    let sent = sink.wait_for(2).await;
    assert_eq!(sent.len(), 2);
    let number = &summary.contract.contract_number;

    let buyer_note = sent.iter().find(|(to, _)| to == BUYER_ID).unwrap();
    assert!(buyer_note.1.contains(number));
    assert!(buyer_note.1.contains("Phone X"));

    let admin_note = sent.iter().find(|(to, _)| to == ADMIN_ID).unwrap();
    assert!(admin_note.1.contains("sold"));
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_creation() {
    let store = seeded_store().await;
    let broken: Arc<dyn NotificationSink> = Arc::new(BrokenSink);
    let contracts = ContractService::new(store.clone(), NotificationDispatcher::new(broken));

    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(store
        .find_contract(&summary.contract.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_rolled_back_creation_sends_nothing() {
    let inner = seeded_store().await;
    let sink = RecordingSink::new();
    let failing: Arc<dyn LedgerStore> = Arc::new(FailingLedgerStore::new(
        inner.clone(),
        FailPoint::UpdateDeviceStatus,
    ));
    let contracts =
        ContractService::new(failing, NotificationDispatcher::new(Arc::new(sink.clone())));

    assert!(contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .is_err());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_update_contract_fields() {
    let store = seeded_store().await;
    let contracts = service(store.clone());
    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();

    let updated = contracts
        .update_contract(
            &summary.contract.id,
            ContractPatch {
                status: Some(ContractStatus::Cancelled),
                end_date: Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, "cancelled");
    assert_eq!(updated.end_date, "2026-01-15");
    // Pricing is never recomputed by an update
    assert_eq!(money(&updated.remaining_balance), dec!(880));
}

#[tokio::test]
async fn test_update_rejects_inverted_dates_and_unknown_admin() {
    let store = seeded_store().await;
    let contracts = service(store.clone());
    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();
    let id = &summary.contract.id;

    let err = contracts
        .update_contract(
            id,
            ContractPatch {
                end_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = contracts
        .update_contract(
            id,
            ContractPatch {
                admin_id: Some("ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ReferenceNotFound { entity: "Admin", .. }
    ));

    let err = contracts
        .update_contract("missing", ContractPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_completing_contract_with_balance_is_rejected() {
    let store = seeded_store().await;
    let contracts = service(store.clone());
    let payments = PaymentService::new(store.clone(), NotificationDispatcher::disabled());
    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();
    let id = &summary.contract.id;

    let err = contracts
        .update_contract(
            id,
            ContractPatch {
                status: Some(ContractStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let contract = store.find_contract(id).await.unwrap().unwrap();
    assert_eq!(contract.status, ContractStatus::Active);
    assert_eq!(contract.remaining_balance, dec!(880));

    // The contract keeps taking installments
    let payment = payments
        .create_payment(payment_request(id, dec!(88)))
        .await
        .unwrap();
    payments.confirm_payment(&payment.id).await.unwrap();
    let contract = store.find_contract(id).await.unwrap().unwrap();
    assert_eq!(contract.remaining_balance, dec!(792));
    assert_balance_matches_schedule(store.as_ref(), id).await;
}

#[tokio::test]
async fn test_delete_contract_with_paid_installment_is_conflict() {
    let store = seeded_store().await;
    let contracts = service(store.clone());
    let payments = PaymentService::new(store.clone(), NotificationDispatcher::disabled());

    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();
    let id = summary.contract.id.clone();

    let payment = payments
        .create_payment(payment_request(&id, dec!(88)))
        .await
        .unwrap();
    payments.confirm_payment(&payment.id).await.unwrap();

    let err = contracts.delete_contract(&id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(store.find_contract(&id).await.unwrap().is_some());
    assert_eq!(
        store.find_device(DEVICE_ID).await.unwrap().status,
        DeviceStatus::Sold
    );
}

#[tokio::test]
async fn test_delete_unpaid_contract_cascades() {
    let store = seeded_store().await;
    let contracts = service(store.clone());
    let summary = contracts
        .create_contract(contract_request(PLAN_10_ID))
        .await
        .unwrap();
    let id = summary.contract.id.clone();

    contracts.delete_contract(&id).await.unwrap();

    assert!(store.find_contract(&id).await.unwrap().is_none());
    assert!(store.find_schedule(&id).await.unwrap().is_empty());
    assert!(store
        .find_payments_by_buyer(BUYER_ID, None)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        store.find_device(DEVICE_ID).await.unwrap().status,
        DeviceStatus::Available
    );

    // The device can be sold again
    contracts
        .create_contract(contract_request(PLAN_5_ID))
        .await
        .unwrap();

    let err = contracts.delete_contract(&id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_list_contracts_pages_newest_first() {
    let store = seeded_store().await;
    for i in 0..3 {
        add_device(&store, &format!("device-page-{}", i), dec!(500)).await;
    }
    let contracts = service(store.clone());

    let mut created = Vec::new();
    for i in 0..3 {
        let mut request = contract_request(PLAN_5_ID);
        request.device_id = format!("device-page-{}", i);
        created.push(contracts.create_contract(request).await.unwrap().contract.id);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let first_page = contracts.list_contracts(2, 0).await.unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].id, created[2]);
    assert_eq!(first_page[1].id, created[1]);

    let second_page = contracts.list_contracts(2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, created[0]);

    assert!(contracts.list_contracts(0, 0).await.is_err());
    assert!(contracts.list_contracts(10, -1).await.is_err());
}
