pub mod models;
pub mod repositories;
pub mod services;

pub use models::LedgerEvent;
pub use services::{
    LogNotificationSink, MySqlNotificationSink, NotificationDispatcher, NotificationSink,
};
