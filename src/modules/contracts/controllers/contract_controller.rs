use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::contracts::models::{ContractPatch, CreateContractRequest, ScheduleEntryResponse};
use crate::modules::contracts::services::ContractService;
use crate::modules::installments::services::InstallmentService;

/// Query parameters for listing contracts
#[derive(Debug, Deserialize)]
pub struct ListContractsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// POST /contracts
///
/// Prices the purchase, creates the contract with its schedule and down
/// payment and marks the device sold.
pub async fn create_contract(
    service: web::Data<Arc<ContractService>>,
    request: web::Json<CreateContractRequest>,
) -> Result<HttpResponse, AppError> {
    let summary = service.create_contract(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(summary))
}

/// GET /contracts
pub async fn list_contracts(
    service: web::Data<Arc<ContractService>>,
    query: web::Query<ListContractsQuery>,
) -> Result<HttpResponse, AppError> {
    let contracts = service.list_contracts(query.limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(contracts))
}

/// GET /contracts/{id}
pub async fn get_contract(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let contract = service.get_contract(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// PATCH /contracts/{id}
/// Administrative correction; pricing is not recomputed
pub async fn update_contract(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
    patch: web::Json<ContractPatch>,
) -> Result<HttpResponse, AppError> {
    let contract = service
        .update_contract(&path.into_inner(), patch.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// DELETE /contracts/{id}
pub async fn delete_contract(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_contract(&path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /contracts/{id}/schedule
pub async fn get_schedule(
    service: web::Data<Arc<InstallmentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let schedule: Vec<ScheduleEntryResponse> = service
        .get_schedule(&path.into_inner())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(schedule))
}

/// Configure contract routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contracts")
            .route("", web::post().to(create_contract))
            .route("", web::get().to(list_contracts))
            .route("/{id}", web::get().to(get_contract))
            .route("/{id}", web::patch().to(update_contract))
            .route("/{id}", web::delete().to(delete_contract))
            .route("/{id}/schedule", web::get().to(get_schedule)),
    );
}
