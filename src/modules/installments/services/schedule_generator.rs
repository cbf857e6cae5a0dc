use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{add_calendar_months, AppError, Result};
use crate::modules::installments::models::ScheduleEntry;

/// One generated installment, before it is tied to a persisted contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledInstallment {
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
}

impl ScheduledInstallment {
    /// Materialize as a pending schedule entry of `contract_id`
    pub fn into_entry(self, contract_id: &str) -> Result<ScheduleEntry> {
        ScheduleEntry::new(
            contract_id.to_string(),
            self.installment_number,
            self.due_date,
            self.amount_due,
        )
    }
}

/// Pure monthly schedule generation
///
/// Entry `i` (0-based) is due `i + 1` calendar months after the start date and
/// owes `monthly_payment`. The final entry absorbs whatever rounding residue is
/// left so the schedule sums to `remaining_balance` exactly.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    pub fn generate(
        start_date: NaiveDate,
        months: i32,
        monthly_payment: Decimal,
        remaining_balance: Decimal,
    ) -> Result<Vec<ScheduledInstallment>> {
        if months <= 0 {
            return Ok(Vec::new());
        }

        let count = months as usize;
        let mut schedule = Vec::with_capacity(count);
        let mut distributed = Decimal::ZERO;

        for i in 0..count {
            let offset = i as u32 + 1;
            let due_date = add_calendar_months(start_date, offset).ok_or_else(|| {
                AppError::validation(format!(
                    "Due date {} months after {} is out of range",
                    offset, start_date
                ))
            })?;

            let amount_due = if i == count - 1 {
                remaining_balance - distributed
            } else {
                monthly_payment
            };

            if amount_due < Decimal::ZERO {
                return Err(AppError::pricing(format!(
                    "monthly payment {} over {} months exceeds balance {}",
                    monthly_payment, months, remaining_balance
                )));
            }

            distributed += amount_due;
            schedule.push(ScheduledInstallment {
                installment_number: offset as i32,
                due_date,
                amount_due,
            });
        }

        Ok(schedule)
    }
}
