pub mod installment_plan;
pub mod schedule_entry;

pub use installment_plan::InstallmentPlan;
pub use schedule_entry::{ScheduleEntry, ScheduleStatus};
