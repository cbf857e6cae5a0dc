pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Payment, PaymentStatus, PaymentView};
pub use repositories::PaymentRepository;
pub use services::PaymentService;
