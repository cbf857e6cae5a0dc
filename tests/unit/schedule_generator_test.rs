// Monthly schedule generation: due dates, amounts and residue handling

use chrono::NaiveDate;
use installment_ledger::core::add_calendar_months;
use installment_ledger::installments::services::ScheduleGenerator;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_even_schedule() {
    let schedule = ScheduleGenerator::generate(date(2025, 1, 15), 10, dec!(88), dec!(880)).unwrap();

    assert_eq!(schedule.len(), 10);
    assert!(schedule.iter().all(|s| s.amount_due == dec!(88)));
    assert_eq!(schedule[0].due_date, date(2025, 2, 15));
    assert_eq!(schedule[9].due_date, date(2025, 11, 15));
    assert_eq!(
        schedule.iter().map(|s| s.installment_number).collect::<Vec<_>>(),
        (1..=10).collect::<Vec<_>>()
    );
}

#[test]
fn test_last_entry_absorbs_residue() {
    let schedule =
        ScheduleGenerator::generate(date(2025, 1, 15), 3, dec!(266.66), dec!(800)).unwrap();

    assert_eq!(schedule[0].amount_due, dec!(266.66));
    assert_eq!(schedule[1].amount_due, dec!(266.66));
    assert_eq!(schedule[2].amount_due, dec!(266.68));
}

#[test]
fn test_end_of_month_start_rolls_over() {
    let schedule = ScheduleGenerator::generate(date(2025, 1, 31), 3, dec!(10), dec!(30)).unwrap();

    assert_eq!(schedule[0].due_date, date(2025, 3, 3));
    assert_eq!(schedule[1].due_date, date(2025, 3, 31));
    assert_eq!(schedule[2].due_date, date(2025, 5, 1));
}

#[test]
fn test_no_months_yields_empty_schedule() {
    let schedule = ScheduleGenerator::generate(date(2025, 1, 1), 0, dec!(800), dec!(800)).unwrap();
    assert!(schedule.is_empty());
}

#[test]
fn test_zero_balance_schedule() {
    let schedule = ScheduleGenerator::generate(date(2025, 1, 1), 4, dec!(0), dec!(0)).unwrap();

    assert_eq!(schedule.len(), 4);
    assert!(schedule.iter().all(|s| s.amount_due.is_zero()));
}

#[test]
fn test_monthly_payment_larger_than_balance_is_rejected() {
    let result = ScheduleGenerator::generate(date(2025, 1, 1), 3, dec!(100), dec!(150));
    assert!(result.is_err());
}

fn start_dates() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=31).prop_filter_map("valid date", |(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d)
    })
}

proptest! {
    #[test]
    fn prop_schedule_sums_to_balance(
        start in start_dates(),
        months in 1i32..=72,
        balance_cents in 0i64..100_000_000,
    ) {
        let balance = Decimal::new(balance_cents, 2);
        let monthly = (balance / Decimal::from(months))
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::ToZero);

        let schedule = ScheduleGenerator::generate(start, months, monthly, balance).unwrap();

        prop_assert_eq!(schedule.len(), months as usize);
        let total: Decimal = schedule.iter().map(|s| s.amount_due).sum();
        prop_assert_eq!(total, balance);
        prop_assert!(schedule.iter().all(|s| s.amount_due >= Decimal::ZERO));
    }

    #[test]
    fn prop_due_dates_strictly_increase(
        start in start_dates(),
        months in 1i32..=72,
    ) {
        let schedule = ScheduleGenerator::generate(start, months, dec!(1), Decimal::from(months)).unwrap();

        prop_assert!(schedule[0].due_date > start);
        for pair in schedule.windows(2) {
            prop_assert!(pair[0].due_date < pair[1].due_date);
        }
        for (i, entry) in schedule.iter().enumerate() {
            prop_assert_eq!(Some(entry.due_date), add_calendar_months(start, i as u32 + 1));
        }
    }

    #[test]
    fn prop_generation_is_deterministic(
        start in start_dates(),
        months in 1i32..=24,
        balance_cents in 0i64..10_000_000,
    ) {
        let balance = Decimal::new(balance_cents, 2);
        let monthly = (balance / Decimal::from(months))
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::ToZero);

        let first = ScheduleGenerator::generate(start, months, monthly, balance).unwrap();
        let second = ScheduleGenerator::generate(start, months, monthly, balance).unwrap();
        prop_assert_eq!(first, second);
    }
}
