use chrono::{Datelike, Days, NaiveDate};

/// Adds calendar months to a date, keeping the day of month.
///
/// When the target month is shorter than the day of month, the surplus days
/// roll over into the following month: Jan 31 + 1 month lands on Mar 3 (Mar 2
/// in a leap year). Installment due dates depend on this exact behavior.
///
/// Returns `None` if the result falls outside chrono's supported range.
pub fn add_calendar_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total_months = date.year() * 12 + date.month0() as i32 + i32::try_from(months).ok()?;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    first_of_month.checked_add_days(Days::new(u64::from(date.day() - 1)))
}
