use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Installment plan template: duration and flat markup
///
/// Plans are read-only for pricing once a contract references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub id: String,
    pub name: String,
    /// Number of monthly installments (> 0)
    pub months: i32,
    /// Flat simple markup applied on the adjusted price
    pub markup_percent: Decimal,
    /// Catalog metadata; the ledger applies a fixed 20% down payment
    pub first_payment_percent: Decimal,
    pub created_at: NaiveDateTime,
}

impl InstallmentPlan {
    pub fn new(
        name: impl Into<String>,
        months: i32,
        markup_percent: Decimal,
        first_payment_percent: Decimal,
    ) -> Result<Self> {
        if months <= 0 {
            return Err(AppError::validation(format!(
                "Plan duration must be at least 1 month, got {}",
                months
            )));
        }

        if markup_percent < Decimal::ZERO {
            return Err(AppError::validation("Markup percent cannot be negative"));
        }

        if first_payment_percent < Decimal::ZERO || first_payment_percent > Decimal::ONE_HUNDRED {
            return Err(AppError::validation(
                "First payment percent must be between 0 and 100",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            months,
            markup_percent,
            first_payment_percent,
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}
