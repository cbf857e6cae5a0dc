// Seeded in-memory ledgers and request builders

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use installment_ledger::contracts::models::{CreateContractRequest, TradeInRequest};
use installment_ledger::installments::models::{InstallmentPlan, ScheduleEntry};
use installment_ledger::modules::devices::models::Device;
use installment_ledger::modules::users::models::User;
use installment_ledger::payments::models::CreatePaymentRequest;
use installment_ledger::{InMemoryLedgerStore, LedgerStore};

pub const BUYER_ID: &str = "buyer-001";
pub const ADMIN_ID: &str = "admin-001";
pub const DEVICE_ID: &str = "device-001";
/// 10 months, 10% markup
pub const PLAN_10_ID: &str = "plan-10m";
/// 5 months, no markup
pub const PLAN_5_ID: &str = "plan-5m";
/// 1 month, no markup
pub const PLAN_1_ID: &str = "plan-1m";

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn plan(id: &str, months: i32, markup: Decimal) -> InstallmentPlan {
    let mut plan = InstallmentPlan::new(format!("{} months", months), months, markup, dec!(20))
        .unwrap();
    plan.id = id.to_string();
    plan
}

/// Store with one buyer, one admin, a 1000.00 device and three plans
pub async fn seeded_store() -> Arc<InMemoryLedgerStore> {
    let store = InMemoryLedgerStore::new();
    store.insert_user(User::new(BUYER_ID, "Test Buyer", "buyer")).await;
    store.insert_user(User::new(ADMIN_ID, "Test Admin", "admin")).await;
    store
        .insert_device(Device::new(DEVICE_ID, "Phone X", dec!(1000)))
        .await;
    store.insert_plan(plan(PLAN_10_ID, 10, dec!(10))).await;
    store.insert_plan(plan(PLAN_5_ID, 5, dec!(0))).await;
    store.insert_plan(plan(PLAN_1_ID, 1, dec!(0))).await;
    Arc::new(store)
}

pub async fn add_device(store: &InMemoryLedgerStore, id: &str, price: Decimal) {
    store.insert_device(Device::new(id, "Extra device", price)).await;
}

pub fn contract_request(plan_id: &str) -> CreateContractRequest {
    CreateContractRequest {
        buyer_id: BUYER_ID.to_string(),
        device_id: DEVICE_ID.to_string(),
        plan_id: plan_id.to_string(),
        admin_id: Some(ADMIN_ID.to_string()),
        trade_in: None,
        start_date: Some(start_date()),
    }
}

pub fn trade_in_request(plan_id: &str, value: Decimal) -> CreateContractRequest {
    CreateContractRequest {
        trade_in: Some(TradeInRequest {
            estimated_value: value,
        }),
        ..contract_request(plan_id)
    }
}

pub fn payment_request(contract_id: &str, amount: Decimal) -> CreatePaymentRequest {
    CreatePaymentRequest {
        contract_id: contract_id.to_string(),
        amount,
        method: "bank_transfer".to_string(),
    }
}

pub fn money(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// Sum of amount due over pending schedule entries
pub fn pending_total(schedule: &[ScheduleEntry]) -> Decimal {
    schedule
        .iter()
        .filter(|e| e.is_pending())
        .map(|e| e.amount_due)
        .sum()
}

/// Asserts the balance invariant of a stored contract
pub async fn assert_balance_matches_schedule(store: &dyn LedgerStore, contract_id: &str) {
    let contract = store.find_contract(contract_id).await.unwrap().unwrap();
    let schedule = store.find_schedule(contract_id).await.unwrap();
    assert_eq!(
        contract.remaining_balance,
        pending_total(&schedule),
        "remaining balance must equal the pending schedule total"
    );
}
