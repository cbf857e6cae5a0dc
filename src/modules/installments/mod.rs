pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{InstallmentPlan, ScheduleEntry, ScheduleStatus};
pub use repositories::{PlanRepository, ScheduleRepository};
pub use services::{InstallmentService, PricingCalculator, ScheduleGenerator};
