pub mod dispatcher;
pub mod notification_sink;

pub use dispatcher::NotificationDispatcher;
pub use notification_sink::{LogNotificationSink, MySqlNotificationSink, NotificationSink};
