use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// One monthly installment obligation of a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub contract_id: String,
    /// Sequential number (1, 2, 3...)
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub paid_amount: Option<Decimal>,
    pub status: ScheduleStatus,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Schedule entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Not yet paid
    Pending,
    /// Settled by a confirmed payment
    Paid,
    Failed,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for ScheduleStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            _ => Err(AppError::internal(format!(
                "Invalid schedule status: {}",
                value
            ))),
        }
    }
}

impl ScheduleEntry {
    /// Create a pending schedule entry for a contract
    pub fn new(
        contract_id: String,
        installment_number: i32,
        due_date: NaiveDate,
        amount_due: Decimal,
    ) -> Result<Self> {
        if installment_number < 1 {
            return Err(AppError::validation(format!(
                "Installment number must be positive, got {}",
                installment_number
            )));
        }

        if amount_due < Decimal::ZERO {
            return Err(AppError::validation("Installment amount cannot be negative"));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            contract_id,
            installment_number,
            due_date,
            amount_due,
            paid_amount: None,
            status: ScheduleStatus::Pending,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ScheduleStatus::Pending
    }

    /// Mark the entry paid; an entry transitions pending -> paid exactly once
    pub fn mark_as_paid(&mut self, amount: Decimal) -> Result<()> {
        if self.status != ScheduleStatus::Pending {
            return Err(AppError::validation(format!(
                "Installment {} is already {}",
                self.installment_number, self.status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        self.status = ScheduleStatus::Paid;
        self.paid_amount = Some(amount);
        self.paid_at = Some(now);
        self.updated_at = now;

        Ok(())
    }

    /// Check if installment is past due date
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.is_pending() && self.due_date < today
    }
}
