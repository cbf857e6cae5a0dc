use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::payments::models::{
    CreatePaymentRequest, PaymentStatus, UpdatePaymentStatusRequest,
};
use crate::modules::payments::services::PaymentService;

/// Query parameters for GET /payments/buyer/{id}
#[derive(Debug, Deserialize)]
pub struct BuyerPaymentsQuery {
    #[serde(default)]
    pub status: Option<PaymentStatus>,
}

/// POST /payments
/// Records a pending payment for the contract's current installment
pub async fn create_payment(
    service: web::Data<Arc<PaymentService>>,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let payment = service.create_payment(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(payment))
}

/// GET /payments/{id}
pub async fn get_payment(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment = service.get_payment(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(payment))
}

/// PATCH /payments/{id}/status
/// `paid` confirms the payment, `failed` rejects it
pub async fn update_payment_status(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
    request: web::Json<UpdatePaymentStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let payment = service
        .update_status(&path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(payment))
}

/// GET /payments/contract/{id}
pub async fn payments_by_contract(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payments = service.payments_by_contract(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(payments))
}

/// GET /payments/buyer/{id}?status=
pub async fn payments_by_buyer(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
    query: web::Query<BuyerPaymentsQuery>,
) -> Result<HttpResponse, AppError> {
    let payments = service
        .payments_by_buyer(&path.into_inner(), query.status)
        .await?;

    Ok(HttpResponse::Ok().json(payments))
}

/// Configure payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(create_payment))
            .route("/contract/{id}", web::get().to(payments_by_contract))
            .route("/buyer/{id}", web::get().to(payments_by_buyer))
            .route("/{id}", web::get().to(get_payment))
            .route("/{id}/status", web::patch().to(update_payment_status)),
    );
}
