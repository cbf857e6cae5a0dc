use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::core::money::{percent_of, round_money, truncate_money};
use crate::core::{AppError, Result};

/// Fixed down payment policy for non trade-in purchases: 20% of the total price
pub const DOWN_PAYMENT_PERCENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Inputs needed to price a purchase
#[derive(Debug, Clone, PartialEq)]
pub struct PricingInput {
    /// Device base price; `None` when the registry has no price recorded
    pub device_price: Option<Decimal>,
    pub months: i32,
    pub markup_percent: Decimal,
    pub is_trade_in: bool,
    pub trade_in_value: Decimal,
}

/// Financial terms of a purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    pub adjusted_price: Decimal,
    pub total_price: Decimal,
    pub initial_payment: Decimal,
    pub remaining_balance: Decimal,
    pub monthly_payment: Decimal,
}

/// Pure pricing rules for installment purchases
///
/// - adjusted price is the device price minus the trade-in value, floored at zero
/// - total price applies the plan's flat markup on the adjusted price
/// - trade-ins carry no down payment, otherwise 20% of the total is due upfront
/// - the monthly payment spreads the remaining balance over the plan's months
///   (a plan with no months is a one-shot balance)
pub struct PricingCalculator;

impl PricingCalculator {
    pub fn calculate(input: &PricingInput) -> Result<PricingBreakdown> {
        let device_price = input
            .device_price
            .ok_or_else(|| AppError::pricing("device price is missing"))?;

        if device_price < Decimal::ZERO {
            return Err(AppError::pricing(format!(
                "device price cannot be negative, got {}",
                device_price
            )));
        }

        if input.markup_percent < Decimal::ZERO {
            return Err(AppError::pricing(format!(
                "markup percent cannot be negative, got {}",
                input.markup_percent
            )));
        }

        if input.trade_in_value < Decimal::ZERO {
            return Err(AppError::pricing(format!(
                "trade-in value cannot be negative, got {}",
                input.trade_in_value
            )));
        }

        let adjusted_price = if input.is_trade_in {
            (device_price - input.trade_in_value).max(Decimal::ZERO)
        } else {
            device_price
        };

        let total_price =
            round_money(adjusted_price + percent_of(adjusted_price, input.markup_percent));

        let initial_payment = if input.is_trade_in {
            Decimal::ZERO
        } else {
            round_money(percent_of(total_price, DOWN_PAYMENT_PERCENT))
        };

        let remaining_balance = total_price - initial_payment;

        let monthly_payment = if input.months > 0 {
            truncate_money(remaining_balance / Decimal::from(input.months))
        } else {
            remaining_balance
        };

        debug!(
            adjusted_price = %adjusted_price,
            total_price = %total_price,
            initial_payment = %initial_payment,
            monthly_payment = %monthly_payment,
            months = input.months,
            "Priced installment purchase"
        );

        Ok(PricingBreakdown {
            adjusted_price,
            total_price,
            initial_payment,
            remaining_balance,
            monthly_payment,
        })
    }
}
