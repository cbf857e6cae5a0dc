//! MySQL ledger storage.
//!
//! Each [`LedgerTransaction`] wraps one `sqlx` transaction. Rows are locked
//! with `SELECT ... FOR UPDATE`. Every flow that touches an existing contract
//! locks the contract row first, then its payment and schedule rows, then the
//! device. Contract creation only locks the device.

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, Transaction};

use super::{LedgerStore, LedgerTransaction};
use crate::core::Result;
use crate::modules::contracts::models::Contract;
use crate::modules::contracts::repositories::ContractRepository;
use crate::modules::devices::models::{Device, DeviceStatus};
use crate::modules::devices::repositories::DeviceRepository;
use crate::modules::installments::models::{InstallmentPlan, ScheduleEntry};
use crate::modules::installments::repositories::{PlanRepository, ScheduleRepository};
use crate::modules::payments::models::{Payment, PaymentStatus, PaymentView};
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::users::repositories::UserRepository;

/// Ledger storage backed by a MySQL connection pool
#[derive(Debug, Clone)]
pub struct MySqlLedgerStore {
    pool: MySqlPool,
}

impl MySqlLedgerStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for MySqlLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlLedgerTransaction { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_plan(&self, plan_id: &str) -> Result<Option<InstallmentPlan>> {
        PlanRepository::find_by_id(&self.pool, plan_id).await
    }

    async fn list_plans(&self) -> Result<Vec<InstallmentPlan>> {
        PlanRepository::list(&self.pool).await
    }

    async fn find_contract(&self, contract_id: &str) -> Result<Option<Contract>> {
        ContractRepository::find_by_id(&self.pool, contract_id).await
    }

    async fn list_contracts(&self, limit: i64, offset: i64) -> Result<Vec<Contract>> {
        ContractRepository::list(&self.pool, limit, offset).await
    }

    async fn find_schedule(&self, contract_id: &str) -> Result<Vec<ScheduleEntry>> {
        ScheduleRepository::find_by_contract(&self.pool, contract_id).await
    }

    async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>> {
        PaymentRepository::find_by_id(&self.pool, payment_id).await
    }

    async fn find_payments_by_contract(&self, contract_id: &str) -> Result<Vec<PaymentView>> {
        PaymentRepository::find_views_by_contract(&self.pool, contract_id).await
    }

    async fn find_payments_by_buyer(
        &self,
        buyer_id: &str,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<PaymentView>> {
        PaymentRepository::find_views_by_buyer(&self.pool, buyer_id, status).await
    }
}

/// Unit of work over one MySQL transaction; rolled back when dropped
pub struct MySqlLedgerTransaction {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl LedgerTransaction for MySqlLedgerTransaction {
    async fn user_exists(&mut self, user_id: &str) -> Result<bool> {
        UserRepository::exists(&mut *self.tx, user_id).await
    }

    async fn find_plan(&mut self, plan_id: &str) -> Result<Option<InstallmentPlan>> {
        PlanRepository::find_by_id(&mut *self.tx, plan_id).await
    }

    async fn find_device_for_update(&mut self, device_id: &str) -> Result<Option<Device>> {
        DeviceRepository::find_for_update(&mut *self.tx, device_id).await
    }

    async fn update_device_status(&mut self, device_id: &str, status: DeviceStatus) -> Result<()> {
        DeviceRepository::update_status(&mut *self.tx, device_id, status).await
    }

    async fn insert_contract(&mut self, contract: &Contract) -> Result<()> {
        ContractRepository::insert(&mut *self.tx, contract).await
    }

    async fn find_contract_for_update(&mut self, contract_id: &str) -> Result<Option<Contract>> {
        ContractRepository::find_by_id_for_update(&mut *self.tx, contract_id).await
    }

    async fn update_contract(&mut self, contract: &Contract) -> Result<()> {
        ContractRepository::update(&mut *self.tx, contract).await
    }

    async fn delete_contract(&mut self, contract_id: &str) -> Result<()> {
        PaymentRepository::delete_by_contract(&mut *self.tx, contract_id).await?;
        ScheduleRepository::delete_by_contract(&mut *self.tx, contract_id).await?;
        ContractRepository::delete(&mut *self.tx, contract_id).await
    }

    async fn insert_schedule_entries(&mut self, entries: &[ScheduleEntry]) -> Result<()> {
        ScheduleRepository::insert_batch(&mut *self.tx, entries).await
    }

    async fn find_oldest_pending_entry(
        &mut self,
        contract_id: &str,
    ) -> Result<Option<ScheduleEntry>> {
        ScheduleRepository::find_oldest_pending_for_update(&mut *self.tx, contract_id).await
    }

    async fn count_paid_entries(&mut self, contract_id: &str) -> Result<i64> {
        ScheduleRepository::count_paid(&mut *self.tx, contract_id).await
    }

    async fn update_schedule_entry(&mut self, entry: &ScheduleEntry) -> Result<()> {
        ScheduleRepository::update(&mut *self.tx, entry).await
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()> {
        PaymentRepository::insert(&mut *self.tx, payment).await
    }

    async fn find_payment(&mut self, payment_id: &str) -> Result<Option<Payment>> {
        PaymentRepository::find_by_id(&mut *self.tx, payment_id).await
    }

    async fn find_payment_for_update(&mut self, payment_id: &str) -> Result<Option<Payment>> {
        PaymentRepository::find_by_id_for_update(&mut *self.tx, payment_id).await
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        PaymentRepository::update(&mut *self.tx, payment).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
