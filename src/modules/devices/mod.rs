pub mod models;
pub mod repositories;

pub use models::{Device, DeviceStatus};
pub use repositories::DeviceRepository;
