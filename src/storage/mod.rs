//! Storage boundary of the ledger.
//!
//! Every multi-step mutation runs inside a [`LedgerTransaction`] obtained
//! from [`LedgerStore::begin`]. The transaction is the unit of atomicity:
//! nothing is visible to other readers until [`LedgerTransaction::commit`],
//! and dropping it without committing rolls everything back. Reads that
//! precede a write (`*_for_update`) lock the row for the rest of the
//! transaction so concurrent buyers of one device, or concurrent
//! confirmations on one contract, are serialized.

use async_trait::async_trait;

use crate::core::Result;
use crate::modules::contracts::models::Contract;
use crate::modules::devices::models::{Device, DeviceStatus};
use crate::modules::installments::models::{InstallmentPlan, ScheduleEntry};
use crate::modules::payments::models::{Payment, PaymentStatus, PaymentView};

pub mod memory;
pub mod mysql;

pub use memory::InMemoryLedgerStore;
pub use mysql::MySqlLedgerStore;

/// Entry point to ledger storage: opens units of work and serves
/// non-transactional reads
///
/// Callers must not hold an open transaction while calling the read methods
/// from the same task.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>>;

    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> Result<()>;

    async fn find_plan(&self, plan_id: &str) -> Result<Option<InstallmentPlan>>;

    async fn list_plans(&self) -> Result<Vec<InstallmentPlan>>;

    async fn find_contract(&self, contract_id: &str) -> Result<Option<Contract>>;

    /// Contracts ordered by creation time, newest first
    async fn list_contracts(&self, limit: i64, offset: i64) -> Result<Vec<Contract>>;

    /// Schedule entries ordered by due date
    async fn find_schedule(&self, contract_id: &str) -> Result<Vec<ScheduleEntry>>;

    async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>>;

    /// Payments of a contract, newest first
    async fn find_payments_by_contract(&self, contract_id: &str) -> Result<Vec<PaymentView>>;

    /// Payments across all contracts of a buyer, newest first
    async fn find_payments_by_buyer(
        &self,
        buyer_id: &str,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<PaymentView>>;
}

/// One atomic unit of ledger work
#[async_trait]
pub trait LedgerTransaction: Send {
    async fn user_exists(&mut self, user_id: &str) -> Result<bool>;

    async fn find_plan(&mut self, plan_id: &str) -> Result<Option<InstallmentPlan>>;

    /// Load and lock a device row
    async fn find_device_for_update(&mut self, device_id: &str) -> Result<Option<Device>>;

    async fn update_device_status(&mut self, device_id: &str, status: DeviceStatus) -> Result<()>;

    async fn insert_contract(&mut self, contract: &Contract) -> Result<()>;

    /// Load and lock a contract row
    async fn find_contract_for_update(&mut self, contract_id: &str) -> Result<Option<Contract>>;

    async fn update_contract(&mut self, contract: &Contract) -> Result<()>;

    /// Remove a contract together with its schedule entries and payments
    async fn delete_contract(&mut self, contract_id: &str) -> Result<()>;

    async fn insert_schedule_entries(&mut self, entries: &[ScheduleEntry]) -> Result<()>;

    /// Earliest-due pending entry of a contract, locked
    async fn find_oldest_pending_entry(&mut self, contract_id: &str)
        -> Result<Option<ScheduleEntry>>;

    async fn count_paid_entries(&mut self, contract_id: &str) -> Result<i64>;

    async fn update_schedule_entry(&mut self, entry: &ScheduleEntry) -> Result<()>;

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()>;

    /// Read a payment without locking it
    async fn find_payment(&mut self, payment_id: &str) -> Result<Option<Payment>>;

    /// Load and lock a payment row; take the contract lock first
    async fn find_payment_for_update(&mut self, payment_id: &str) -> Result<Option<Payment>>;

    async fn update_payment(&mut self, payment: &Payment) -> Result<()>;

    /// Make every change of this unit visible atomically
    async fn commit(self: Box<Self>) -> Result<()>;
}
