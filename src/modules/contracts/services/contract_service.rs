// Contract ledger
//
// Contract creation runs as one atomic unit: reference checks, pricing,
// contract row, schedule batch, down payment and the device status change
// either all commit or none persist. Notifications are dispatched only after
// the commit succeeded.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{add_calendar_months, AppError, Result};
use crate::modules::contracts::models::{
    Contract, ContractDetails, ContractPatch, ContractResponse, ContractSummary,
    CreateContractRequest, NewContract,
};
use crate::modules::devices::models::{Device, DeviceStatus};
use crate::modules::installments::models::{InstallmentPlan, ScheduleEntry};
use crate::modules::installments::services::{PricingCalculator, PricingInput, ScheduleGenerator};
use crate::modules::notifications::{LedgerEvent, NotificationDispatcher};
use crate::modules::payments::models::Payment;
use crate::storage::{LedgerStore, LedgerTransaction};

/// Upper bound for a single page of contracts
pub const MAX_PAGE_SIZE: i64 = 200;

/// Service for contract business logic
pub struct ContractService {
    store: Arc<dyn LedgerStore>,
    notifications: NotificationDispatcher,
}

impl ContractService {
    pub fn new(store: Arc<dyn LedgerStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Create a contract, its schedule and down payment, and sell the device
    pub async fn create_contract(&self, request: CreateContractRequest) -> Result<ContractSummary> {
        let mut tx = self.store.begin().await?;
        let (summary, events) = Self::create_contract_with_tx(tx.as_mut(), request).await?;
        tx.commit().await?;

        info!(
            contract_id = summary.contract.id.as_str(),
            contract_number = summary.contract.contract_number.as_str(),
            device_id = summary.contract.device_id.as_str(),
            total_price = summary.contract.total_price.as_str(),
            "Contract created"
        );

        self.notifications.dispatch(events);
        Ok(summary)
    }

    /// Contract creation inside a caller-owned unit of work
    ///
    /// Nothing is committed here. On error the caller drops the transaction,
    /// which discards every write made so far.
    pub async fn create_contract_with_tx(
        tx: &mut dyn LedgerTransaction,
        request: CreateContractRequest,
    ) -> Result<(ContractSummary, Vec<LedgerEvent>)> {
        ensure_buyer(tx, &request.buyer_id).await?;
        if let Some(admin_id) = request.admin_id.as_deref() {
            ensure_admin(tx, admin_id).await?;
        }
        let plan = load_plan(tx, &request.plan_id).await?;
        let device = load_device(tx, &request.device_id).await?;

        if !device.is_purchasable() {
            return Err(AppError::conflict(format!(
                "Device '{}' is already sold",
                device.id
            )));
        }

        if plan.months <= 0 {
            return Err(AppError::pricing(format!(
                "plan '{}' has no installment months",
                plan.id
            )));
        }

        let trade_in_value = request
            .trade_in
            .as_ref()
            .map(|t| t.estimated_value)
            .unwrap_or(Decimal::ZERO);
        let is_trade_in = request.trade_in.is_some();

        let pricing = PricingCalculator::calculate(&PricingInput {
            device_price: device.base_price,
            months: plan.months,
            markup_percent: plan.markup_percent,
            is_trade_in,
            trade_in_value,
        })?;

        let start_date = request
            .start_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let end_date = add_calendar_months(start_date, plan.months as u32).ok_or_else(|| {
            AppError::validation(format!(
                "Contract end date {} months after {} is out of range",
                plan.months, start_date
            ))
        })?;

        let installments = ScheduleGenerator::generate(
            start_date,
            plan.months,
            pricing.monthly_payment,
            pricing.remaining_balance,
        )?;

        let contract = Contract::new(
            NewContract {
                buyer_id: request.buyer_id,
                device_id: device.id.clone(),
                admin_id: request.admin_id,
                plan_id: plan.id.clone(),
                duration_months: plan.months,
                start_date,
                end_date,
                is_trade_in,
                trade_in_value,
            },
            &pricing,
        );
        tx.insert_contract(&contract).await?;

        let entries = installments
            .into_iter()
            .map(|installment| installment.into_entry(&contract.id))
            .collect::<Result<Vec<ScheduleEntry>>>()?;
        tx.insert_schedule_entries(&entries).await?;

        let initial_payment_id = if is_trade_in {
            None
        } else {
            let payment = Payment::initial(contract.id.clone(), contract.initial_payment)?;
            tx.insert_payment(&payment).await?;
            Some(payment.id)
        };

        tx.update_device_status(&device.id, DeviceStatus::Sold)
            .await?;

        let mut events = vec![LedgerEvent::ContractCreated {
            buyer_id: contract.buyer_id.clone(),
            contract_number: contract.contract_number.clone(),
            device_name: device.name.clone(),
        }];
        if let Some(admin_id) = contract.admin_id.clone() {
            events.push(LedgerEvent::DeviceSold {
                admin_id,
                device_name: device.name,
                contract_number: contract.contract_number.clone(),
            });
        }

        let summary = ContractSummary {
            adjusted_price: pricing.adjusted_price.to_string(),
            schedule: entries.into_iter().map(Into::into).collect(),
            initial_payment_id,
            contract: contract.into(),
        };

        Ok((summary, events))
    }

    /// Contract with its schedule
    pub async fn get_contract(&self, contract_id: &str) -> Result<ContractDetails> {
        let contract = self
            .store
            .find_contract(contract_id)
            .await?
            .ok_or_else(|| contract_not_found(contract_id))?;
        let schedule = self.store.find_schedule(contract_id).await?;

        Ok(ContractDetails {
            contract: contract.into(),
            schedule: schedule.into_iter().map(Into::into).collect(),
        })
    }

    /// Contracts newest first
    pub async fn list_contracts(&self, limit: i64, offset: i64) -> Result<Vec<ContractResponse>> {
        if limit < 1 || limit > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if offset < 0 {
            return Err(AppError::validation("offset cannot be negative"));
        }

        let contracts = self.store.list_contracts(limit, offset).await?;
        Ok(contracts.into_iter().map(Into::into).collect())
    }

    /// Administrative correction of status, dates or admin
    ///
    /// Pricing and the schedule are not recomputed.
    pub async fn update_contract(
        &self,
        contract_id: &str,
        patch: ContractPatch,
    ) -> Result<ContractResponse> {
        let mut tx = self.store.begin().await?;

        let mut contract = tx
            .find_contract_for_update(contract_id)
            .await?
            .ok_or_else(|| contract_not_found(contract_id))?;

        if let Some(admin_id) = patch.admin_id.as_deref() {
            ensure_admin(tx.as_mut(), admin_id).await?;
        }

        contract.apply_patch(&patch)?;
        tx.update_contract(&contract).await?;
        tx.commit().await?;

        info!(
            contract_id = contract_id,
            status = %contract.status,
            "Contract updated"
        );

        Ok(contract.into())
    }

    /// Delete a contract that has no settled installments
    ///
    /// Schedule entries and payments are removed with it and the device goes
    /// back to `available`.
    pub async fn delete_contract(&self, contract_id: &str) -> Result<()> {
        let mut tx = self.store.begin().await?;

        let contract = tx
            .find_contract_for_update(contract_id)
            .await?
            .ok_or_else(|| contract_not_found(contract_id))?;

        let paid_entries = tx.count_paid_entries(contract_id).await?;
        if paid_entries > 0 {
            warn!(
                contract_id = contract_id,
                paid_entries = paid_entries,
                "Refusing to delete contract with settled installments"
            );
            return Err(AppError::conflict(format!(
                "Contract '{}' has {} paid installment(s) and cannot be deleted",
                contract.contract_number, paid_entries
            )));
        }

        tx.delete_contract(contract_id).await?;
        match tx.find_device_for_update(&contract.device_id).await? {
            Some(device) => {
                tx.update_device_status(&device.id, DeviceStatus::Available)
                    .await?
            }
            None => warn!(
                contract_id = contract_id,
                device_id = contract.device_id.as_str(),
                "Device of deleted contract no longer exists"
            ),
        }
        tx.commit().await?;

        info!(
            contract_id = contract_id,
            device_id = contract.device_id.as_str(),
            "Contract deleted"
        );

        Ok(())
    }
}

fn contract_not_found(contract_id: &str) -> AppError {
    AppError::not_found(format!("Contract '{}' not found", contract_id))
}

async fn ensure_buyer(tx: &mut dyn LedgerTransaction, buyer_id: &str) -> Result<()> {
    if tx.user_exists(buyer_id).await? {
        Ok(())
    } else {
        Err(AppError::reference_not_found("Buyer", buyer_id))
    }
}

async fn ensure_admin(tx: &mut dyn LedgerTransaction, admin_id: &str) -> Result<()> {
    if tx.user_exists(admin_id).await? {
        Ok(())
    } else {
        Err(AppError::reference_not_found("Admin", admin_id))
    }
}

async fn load_plan(tx: &mut dyn LedgerTransaction, plan_id: &str) -> Result<InstallmentPlan> {
    tx.find_plan(plan_id)
        .await?
        .ok_or_else(|| AppError::reference_not_found("Plan", plan_id))
}

/// Locks the device row until the unit of work ends
async fn load_device(tx: &mut dyn LedgerTransaction, device_id: &str) -> Result<Device> {
    tx.find_device_for_update(device_id)
        .await?
        .ok_or_else(|| AppError::reference_not_found("Device", device_id))
}
