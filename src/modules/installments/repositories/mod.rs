pub mod plan_repository;
pub mod schedule_repository;

pub use plan_repository::PlanRepository;
pub use schedule_repository::ScheduleRepository;
