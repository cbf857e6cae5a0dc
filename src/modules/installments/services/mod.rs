pub mod installment_service;
pub mod pricing_calculator;
pub mod schedule_generator;

pub use installment_service::InstallmentService;
pub use pricing_calculator::{PricingBreakdown, PricingCalculator, PricingInput, DOWN_PAYMENT_PERCENT};
pub use schedule_generator::{ScheduleGenerator, ScheduledInstallment};
