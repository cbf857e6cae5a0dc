pub mod payment;

pub use payment::{
    CreatePaymentRequest, Payment, PaymentStatus, PaymentView, UpdatePaymentStatusRequest,
};
