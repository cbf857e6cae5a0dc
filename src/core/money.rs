use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for every stored monetary amount
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to the ledger's monetary scale (half away from zero)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates an amount toward zero at the monetary scale
///
/// Used for per-installment amounts so the final installment only ever absorbs
/// a non-negative residue.
pub fn truncate_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero)
}

/// Returns `percent`% of `amount`, unrounded
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

/// Formats an amount for display: thousands separators and two decimals
///
/// `1100` becomes `"1,100.00"`, `-1234567.891` becomes `"-1,234,567.89"`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{}{}.{}", sign, grouped, frac_part)
}
