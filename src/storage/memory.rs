//! In-process ledger storage.
//!
//! A single async mutex guards the whole state. A transaction holds the lock
//! from `begin` until it is committed or dropped and works on a private copy,
//! so units of work are fully serialized and a dropped transaction leaves
//! the shared state untouched.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LedgerStore, LedgerTransaction};
use crate::core::{AppError, Result};
use crate::modules::contracts::models::Contract;
use crate::modules::devices::models::{Device, DeviceStatus};
use crate::modules::installments::models::{InstallmentPlan, ScheduleEntry, ScheduleStatus};
use crate::modules::payments::models::{Payment, PaymentStatus, PaymentView};
use crate::modules::users::models::User;

#[derive(Debug, Clone, Default)]
struct LedgerState {
    users: HashMap<String, User>,
    devices: HashMap<String, Device>,
    plans: Vec<InstallmentPlan>,
    contracts: Vec<Contract>,
    schedule: Vec<ScheduleEntry>,
    payments: Vec<Payment>,
}

impl LedgerState {
    fn contract(&self, contract_id: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == contract_id)
    }

    fn payment_view(&self, payment: &Payment) -> Option<PaymentView> {
        self.contract(&payment.contract_id).map(|contract| {
            PaymentView::new(
                payment.clone(),
                contract.contract_number.clone(),
                contract.buyer_id.clone(),
            )
        })
    }
}

/// Ledger storage kept in memory, used by tests and `STORAGE_BACKEND=memory`
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id.clone(), user);
    }

    pub async fn insert_device(&self, device: Device) {
        self.state
            .lock()
            .await
            .devices
            .insert(device.id.clone(), device);
    }

    pub async fn insert_plan(&self, plan: InstallmentPlan) {
        self.state.lock().await.plans.push(plan);
    }

    pub async fn find_device(&self, device_id: &str) -> Option<Device> {
        self.state.lock().await.devices.get(device_id).cloned()
    }

    /// Seed a small catalog for local runs with `STORAGE_BACKEND=memory`
    pub async fn seed_demo_catalog(&self) -> Result<()> {
        self.insert_user(User::new("demo-buyer", "Demo Buyer", "buyer"))
            .await;
        self.insert_user(User::new("demo-admin", "Demo Admin", "admin"))
            .await;

        for (id, name, price) in [
            ("demo-phone", "Demo Phone", Decimal::new(1000, 0)),
            ("demo-tablet", "Demo Tablet", Decimal::new(1500, 0)),
        ] {
            self.insert_device(Device::new(id, name, price)).await;
        }

        for (name, months, markup) in [
            ("6 months", 6, Decimal::new(5, 0)),
            ("12 months", 12, Decimal::new(10, 0)),
        ] {
            let mut plan = InstallmentPlan::new(name, months, markup, Decimal::new(20, 0))?;
            plan.id = format!("demo-plan-{}", months);
            self.insert_plan(plan).await;
        }

        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryLedgerTransaction { guard, working }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_plan(&self, plan_id: &str) -> Result<Option<InstallmentPlan>> {
        let state = self.state.lock().await;
        Ok(state.plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<InstallmentPlan>> {
        let state = self.state.lock().await;
        let mut plans = state.plans.clone();
        plans.sort_by_key(|p| p.months);
        Ok(plans)
    }

    async fn find_contract(&self, contract_id: &str) -> Result<Option<Contract>> {
        Ok(self.state.lock().await.contract(contract_id).cloned())
    }

    async fn list_contracts(&self, limit: i64, offset: i64) -> Result<Vec<Contract>> {
        let state = self.state.lock().await;
        Ok(state
            .contracts
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_schedule(&self, contract_id: &str) -> Result<Vec<ScheduleEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<ScheduleEntry> = state
            .schedule
            .iter()
            .filter(|e| e.contract_id == contract_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.due_date, e.installment_number));
        Ok(entries)
    }

    async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>> {
        let state = self.state.lock().await;
        Ok(state.payments.iter().find(|p| p.id == payment_id).cloned())
    }

    async fn find_payments_by_contract(&self, contract_id: &str) -> Result<Vec<PaymentView>> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .iter()
            .rev()
            .filter(|p| p.contract_id == contract_id)
            .filter_map(|p| state.payment_view(p))
            .collect())
    }

    async fn find_payments_by_buyer(
        &self,
        buyer_id: &str,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<PaymentView>> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .iter()
            .rev()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter_map(|p| state.payment_view(p))
            .filter(|view| view.buyer_id == buyer_id)
            .collect())
    }
}

/// Unit of work over [`InMemoryLedgerStore`]
pub struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

impl InMemoryLedgerTransaction {
    fn contract_mut(&mut self, contract_id: &str) -> Result<&mut Contract> {
        self.working
            .contracts
            .iter_mut()
            .find(|c| c.id == contract_id)
            .ok_or_else(|| AppError::not_found(format!("Contract '{}' not found", contract_id)))
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn user_exists(&mut self, user_id: &str) -> Result<bool> {
        Ok(self.working.users.contains_key(user_id))
    }

    async fn find_plan(&mut self, plan_id: &str) -> Result<Option<InstallmentPlan>> {
        Ok(self.working.plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn find_device_for_update(&mut self, device_id: &str) -> Result<Option<Device>> {
        Ok(self.working.devices.get(device_id).cloned())
    }

    async fn update_device_status(&mut self, device_id: &str, status: DeviceStatus) -> Result<()> {
        let device = self
            .working
            .devices
            .get_mut(device_id)
            .ok_or_else(|| AppError::not_found(format!("Device '{}' not found", device_id)))?;
        device.status = status;
        Ok(())
    }

    async fn insert_contract(&mut self, contract: &Contract) -> Result<()> {
        if self.working.contract(&contract.id).is_some() {
            return Err(AppError::conflict(format!(
                "Contract '{}' already exists",
                contract.id
            )));
        }
        self.working.contracts.push(contract.clone());
        Ok(())
    }

    async fn find_contract_for_update(&mut self, contract_id: &str) -> Result<Option<Contract>> {
        Ok(self.working.contract(contract_id).cloned())
    }

    async fn update_contract(&mut self, contract: &Contract) -> Result<()> {
        *self.contract_mut(&contract.id)? = contract.clone();
        Ok(())
    }

    async fn delete_contract(&mut self, contract_id: &str) -> Result<()> {
        self.contract_mut(contract_id)?;
        self.working.payments.retain(|p| p.contract_id != contract_id);
        self.working.schedule.retain(|e| e.contract_id != contract_id);
        self.working.contracts.retain(|c| c.id != contract_id);
        Ok(())
    }

    async fn insert_schedule_entries(&mut self, entries: &[ScheduleEntry]) -> Result<()> {
        self.working.schedule.extend_from_slice(entries);
        Ok(())
    }

    async fn find_oldest_pending_entry(
        &mut self,
        contract_id: &str,
    ) -> Result<Option<ScheduleEntry>> {
        Ok(self
            .working
            .schedule
            .iter()
            .filter(|e| e.contract_id == contract_id && e.status == ScheduleStatus::Pending)
            .min_by_key(|e| (e.due_date, e.installment_number))
            .cloned())
    }

    async fn count_paid_entries(&mut self, contract_id: &str) -> Result<i64> {
        Ok(self
            .working
            .schedule
            .iter()
            .filter(|e| e.contract_id == contract_id && e.status == ScheduleStatus::Paid)
            .count() as i64)
    }

    async fn update_schedule_entry(&mut self, entry: &ScheduleEntry) -> Result<()> {
        let existing = self
            .working
            .schedule
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| AppError::not_found("Schedule entry not found"))?;
        *existing = entry.clone();
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()> {
        self.working.payments.push(payment.clone());
        Ok(())
    }

    async fn find_payment(&mut self, payment_id: &str) -> Result<Option<Payment>> {
        self.find_payment_for_update(payment_id).await
    }

    async fn find_payment_for_update(&mut self, payment_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .working
            .payments
            .iter()
            .find(|p| p.id == payment_id)
            .cloned())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        let existing = self
            .working
            .payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or_else(|| AppError::not_found(format!("Payment '{}' not found", payment.id)))?;
        *existing = payment.clone();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryLedgerTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
