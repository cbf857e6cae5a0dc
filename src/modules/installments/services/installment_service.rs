// Installment catalog and schedule queries
//
// Plans are read-only reference data; schedules are created by the contract
// ledger and only read here.

use std::sync::Arc;

use tracing::debug;

use crate::core::{AppError, Result};
use crate::modules::installments::models::{InstallmentPlan, ScheduleEntry};
use crate::storage::LedgerStore;

/// Service for installment plan and schedule lookups
pub struct InstallmentService {
    store: Arc<dyn LedgerStore>,
}

impl InstallmentService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// All plans, shortest duration first
    pub async fn list_plans(&self) -> Result<Vec<InstallmentPlan>> {
        self.store.list_plans().await
    }

    pub async fn get_plan(&self, plan_id: &str) -> Result<InstallmentPlan> {
        self.store
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment plan '{}' not found", plan_id)))
    }

    /// Schedule of a contract ordered by due date
    ///
    /// # Returns
    /// * `NotFound` if the contract does not exist
    pub async fn get_schedule(&self, contract_id: &str) -> Result<Vec<ScheduleEntry>> {
        if self.store.find_contract(contract_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Contract '{}' not found",
                contract_id
            )));
        }

        let schedule = self.store.find_schedule(contract_id).await?;
        debug!(
            contract_id = contract_id,
            entries = schedule.len(),
            "Loaded installment schedule"
        );

        Ok(schedule)
    }
}
