use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::core::{format_amount, AppError, Result};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Recorded, awaiting confirmation
    #[default]
    Pending,
    /// Confirmed and applied to the contract
    Paid,
    /// Rejected; never touches schedule or balance
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// Payment attempt against a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub contract_id: String,
    /// Schedule entry settled by this payment, set on confirmation
    pub schedule_entry_id: Option<String>,
    pub amount: Decimal,
    /// Payment method (cash, bank_transfer, card, ...)
    pub method: String,
    pub status: PaymentStatus,
    pub failure_reason: Option<String>,
    pub payment_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Payment {
    /// Create a pending payment
    pub fn new(contract_id: String, amount: Decimal, method: String) -> Result<Self> {
        if amount < Decimal::ZERO {
            return Err(AppError::validation("Payment amount must be non-negative"));
        }

        if contract_id.trim().is_empty() {
            return Err(AppError::validation("Contract ID cannot be empty"));
        }

        if method.trim().is_empty() {
            return Err(AppError::validation("Payment method cannot be empty"));
        }

        let now = Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            contract_id,
            schedule_entry_id: None,
            amount,
            method,
            status: PaymentStatus::Pending,
            failure_reason: None,
            payment_date: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Down payment recorded together with the contract, already paid
    pub fn initial(contract_id: String, amount: Decimal) -> Result<Self> {
        let mut payment = Self::new(contract_id, amount, "down_payment".to_string())?;
        payment.status = PaymentStatus::Paid;
        Ok(payment)
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Mark paid against the schedule entry it settles
    pub fn mark_paid(&mut self, schedule_entry_id: String) -> Result<()> {
        match self.status {
            PaymentStatus::Paid => return Err(AppError::AlreadyCompleted(self.id.clone())),
            PaymentStatus::Failed => {
                return Err(AppError::validation(format!(
                    "Payment '{}' was rejected and cannot be confirmed",
                    self.id
                )))
            }
            PaymentStatus::Pending => {}
        }

        let now = Utc::now().naive_utc();
        self.status = PaymentStatus::Paid;
        self.schedule_entry_id = Some(schedule_entry_id);
        self.payment_date = now;
        self.updated_at = now;
        Ok(())
    }

    /// Mark failed; a paid payment cannot be rejected
    pub fn mark_failed(&mut self, reason: Option<String>) -> Result<()> {
        if self.status == PaymentStatus::Paid {
            return Err(AppError::AlreadyCompleted(self.id.clone()));
        }

        self.status = PaymentStatus::Failed;
        self.failure_reason = reason;
        self.updated_at = Utc::now().naive_utc();
        Ok(())
    }
}

/// Request body for POST /payments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub contract_id: String,
    pub amount: Decimal,
    pub method: String,
}

/// Request body for PATCH /payments/{id}/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Read model for payment queries, joined with its contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: String,
    pub contract_id: String,
    pub contract_number: String,
    pub buyer_id: String,
    pub schedule_entry_id: Option<String>,
    pub amount: String,
    pub formatted_amount: String,
    pub method: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub payment_date: String,
}

impl PaymentView {
    pub fn new(payment: Payment, contract_number: String, buyer_id: String) -> Self {
        Self {
            formatted_amount: format_amount(payment.amount),
            amount: payment.amount.to_string(),
            id: payment.id,
            contract_id: payment.contract_id,
            contract_number,
            buyer_id,
            schedule_entry_id: payment.schedule_entry_id,
            method: payment.method,
            status: payment.status,
            failure_reason: payment.failure_reason,
            payment_date: payment.payment_date.to_string(),
        }
    }
}
