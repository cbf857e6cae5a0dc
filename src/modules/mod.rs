pub mod contracts;
pub mod devices;
pub mod health;
pub mod installments;
pub mod notifications;
pub mod payments;
pub mod users;
