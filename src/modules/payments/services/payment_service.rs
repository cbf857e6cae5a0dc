// Payment processor
//
// A payment is recorded pending against the contract's earliest-due pending
// installment and settles it on confirmation. Confirmation marks the payment
// and the schedule entry paid and decrements the contract balance in one
// atomic unit.

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{AppError, Result};
use crate::modules::contracts::models::{Contract, ContractStatus};
use crate::modules::installments::models::ScheduleEntry;
use crate::modules::notifications::{LedgerEvent, NotificationDispatcher};
use crate::modules::payments::models::{
    CreatePaymentRequest, Payment, PaymentStatus, PaymentView, UpdatePaymentStatusRequest,
};
use crate::storage::{LedgerStore, LedgerTransaction};

/// Service for payment business logic
pub struct PaymentService {
    store: Arc<dyn LedgerStore>,
    notifications: NotificationDispatcher,
}

impl PaymentService {
    pub fn new(store: Arc<dyn LedgerStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Record a pending payment for the contract's current installment
    pub async fn create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentView> {
        let mut tx = self.store.begin().await?;

        let contract = load_payable_contract(tx.as_mut(), &request.contract_id).await?;
        let entry = current_installment(tx.as_mut(), &contract.id).await?;
        ensure_amount_matches(&entry, request.amount)?;

        let payment = Payment::new(contract.id.clone(), request.amount, request.method)?;
        tx.insert_payment(&payment).await?;
        tx.commit().await?;

        info!(
            payment_id = payment.id.as_str(),
            contract_id = contract.id.as_str(),
            installment_number = entry.installment_number,
            amount = %payment.amount,
            "Payment recorded"
        );

        Ok(PaymentView::new(
            payment,
            contract.contract_number,
            contract.buyer_id,
        ))
    }

    /// Confirm a pending payment and apply it to the contract
    ///
    /// # Errors
    /// * `NotFound` - unknown payment
    /// * `AlreadyCompleted` - payment was confirmed before; nothing changes
    /// * `NoPendingSchedule` - contract has no installment left to settle
    /// * `AmountMismatch` - payment does not cover the installment exactly
    pub async fn confirm_payment(&self, payment_id: &str) -> Result<PaymentView> {
        let mut tx = self.store.begin().await?;
        let (view, event) = Self::confirm_payment_with_tx(tx.as_mut(), payment_id).await?;
        tx.commit().await?;

        info!(
            payment_id = payment_id,
            contract_id = view.contract_id.as_str(),
            amount = view.amount.as_str(),
            "Payment confirmed"
        );

        self.notifications.dispatch(vec![event]);
        Ok(view)
    }

    /// Confirmation inside a caller-owned unit of work; nothing is committed
    pub async fn confirm_payment_with_tx(
        tx: &mut dyn LedgerTransaction,
        payment_id: &str,
    ) -> Result<(PaymentView, LedgerEvent)> {
        let snapshot = peek_payment(tx, payment_id).await?;
        if snapshot.is_paid() {
            return Err(AppError::AlreadyCompleted(snapshot.id));
        }
        let mut contract = load_payable_contract(tx, &snapshot.contract_id).await?;

        let mut payment = load_payment(tx, payment_id).await?;
        if payment.is_paid() {
            return Err(AppError::AlreadyCompleted(payment.id));
        }

        let mut entry = current_installment(tx, &contract.id).await?;
        ensure_amount_matches(&entry, payment.amount)?;

        payment.mark_paid(entry.id.clone())?;
        entry.mark_as_paid(payment.amount)?;
        contract.apply_payment(payment.amount)?;

        tx.update_payment(&payment).await?;
        tx.update_schedule_entry(&entry).await?;

        if tx.find_oldest_pending_entry(&contract.id).await?.is_none() {
            contract.complete();
            info!(
                contract_id = contract.id.as_str(),
                "All installments settled, contract completed"
            );
        }
        tx.update_contract(&contract).await?;

        let event = LedgerEvent::PaymentConfirmed {
            buyer_id: contract.buyer_id.clone(),
            contract_number: contract.contract_number.clone(),
            amount: payment.amount,
            remaining_balance: contract.remaining_balance,
        };

        Ok((
            PaymentView::new(payment, contract.contract_number, contract.buyer_id),
            event,
        ))
    }

    /// Mark a payment failed; schedule and balance stay untouched
    pub async fn reject_payment(
        &self,
        payment_id: &str,
        reason: Option<String>,
    ) -> Result<PaymentView> {
        let mut tx = self.store.begin().await?;

        let contract_id = peek_payment(tx.as_mut(), payment_id).await?.contract_id;
        let contract = tx
            .find_contract_for_update(&contract_id)
            .await?
            .ok_or_else(|| contract_not_found(&contract_id))?;

        let mut payment = load_payment(tx.as_mut(), payment_id).await?;
        payment.mark_failed(reason)?;
        tx.update_payment(&payment).await?;
        tx.commit().await?;

        warn!(
            payment_id = payment_id,
            contract_id = contract.id.as_str(),
            reason = payment.failure_reason.as_deref().unwrap_or(""),
            "Payment rejected"
        );

        self.notifications.dispatch(vec![LedgerEvent::PaymentRejected {
            buyer_id: contract.buyer_id.clone(),
            contract_number: contract.contract_number.clone(),
            amount: payment.amount,
            reason: payment.failure_reason.clone(),
        }]);

        Ok(PaymentView::new(
            payment,
            contract.contract_number,
            contract.buyer_id,
        ))
    }

    /// PATCH /payments/{id}/status: route to confirm or reject
    pub async fn update_status(
        &self,
        payment_id: &str,
        request: UpdatePaymentStatusRequest,
    ) -> Result<PaymentView> {
        match request.status {
            PaymentStatus::Paid => self.confirm_payment(payment_id).await,
            PaymentStatus::Failed => self.reject_payment(payment_id, request.reason).await,
            PaymentStatus::Pending => Err(AppError::validation(
                "Payment status can only be changed to 'paid' or 'failed'",
            )),
        }
    }

    pub async fn get_payment(&self, payment_id: &str) -> Result<PaymentView> {
        let payment = self
            .store
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| payment_not_found(payment_id))?;
        let contract = self
            .store
            .find_contract(&payment.contract_id)
            .await?
            .ok_or_else(|| contract_not_found(&payment.contract_id))?;

        Ok(PaymentView::new(
            payment,
            contract.contract_number,
            contract.buyer_id,
        ))
    }

    /// Payments of a contract, newest first
    pub async fn payments_by_contract(&self, contract_id: &str) -> Result<Vec<PaymentView>> {
        if self.store.find_contract(contract_id).await?.is_none() {
            return Err(contract_not_found(contract_id));
        }

        self.store.find_payments_by_contract(contract_id).await
    }

    /// Payments across all contracts of a buyer, optionally by status
    pub async fn payments_by_buyer(
        &self,
        buyer_id: &str,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<PaymentView>> {
        self.store.find_payments_by_buyer(buyer_id, status).await
    }
}

fn payment_not_found(payment_id: &str) -> AppError {
    AppError::not_found(format!("Payment '{}' not found", payment_id))
}

fn contract_not_found(contract_id: &str) -> AppError {
    AppError::not_found(format!("Contract '{}' not found", contract_id))
}

/// Unlocked read, used to find the contract to lock before the payment row
async fn peek_payment(tx: &mut dyn LedgerTransaction, payment_id: &str) -> Result<Payment> {
    tx.find_payment(payment_id)
        .await?
        .ok_or_else(|| payment_not_found(payment_id))
}

/// Lock a payment row; the contract lock must already be held
async fn load_payment(tx: &mut dyn LedgerTransaction, payment_id: &str) -> Result<Payment> {
    tx.find_payment_for_update(payment_id)
        .await?
        .ok_or_else(|| payment_not_found(payment_id))
}

/// Lock the contract a payment applies to
///
/// Cancelled contracts refuse payments; a completed contract has nothing
/// left to settle and fails with `NoPendingSchedule`.
async fn load_payable_contract(
    tx: &mut dyn LedgerTransaction,
    contract_id: &str,
) -> Result<Contract> {
    let contract = tx
        .find_contract_for_update(contract_id)
        .await?
        .ok_or_else(|| contract_not_found(contract_id))?;

    match contract.status {
        ContractStatus::Active => Ok(contract),
        ContractStatus::Completed => Err(AppError::NoPendingSchedule(contract.id)),
        ContractStatus::Cancelled => Err(AppError::validation(format!(
            "Contract '{}' is cancelled and does not accept payments",
            contract.contract_number
        ))),
    }
}

/// Earliest-due pending installment, locked
async fn current_installment(
    tx: &mut dyn LedgerTransaction,
    contract_id: &str,
) -> Result<ScheduleEntry> {
    tx.find_oldest_pending_entry(contract_id)
        .await?
        .ok_or_else(|| AppError::NoPendingSchedule(contract_id.to_string()))
}

fn ensure_amount_matches(entry: &ScheduleEntry, amount: rust_decimal::Decimal) -> Result<()> {
    if amount != entry.amount_due {
        return Err(AppError::AmountMismatch {
            expected: entry.amount_due,
            actual: amount,
        });
    }
    Ok(())
}
