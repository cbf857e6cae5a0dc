pub mod calendar;
pub mod error;
pub mod money;

pub use calendar::add_calendar_months;
pub use error::{AppError, Result};
pub use money::{format_amount, round_money, truncate_money};
