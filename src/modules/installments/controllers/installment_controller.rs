// HTTP handlers for the installment plan catalog
//
// Endpoints:
// - GET /plans       - List plans
// - GET /plans/{id}  - Get a single plan

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::modules::installments::{models::InstallmentPlan, services::InstallmentService};

/// Response for a single plan; percentages as decimal strings
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub id: String,
    pub name: String,
    pub months: i32,
    pub markup_percent: String,
    pub first_payment_percent: String,
}

impl From<InstallmentPlan> for PlanResponse {
    fn from(plan: InstallmentPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            months: plan.months,
            markup_percent: plan.markup_percent.to_string(),
            first_payment_percent: plan.first_payment_percent.to_string(),
        }
    }
}

/// GET /plans
pub async fn list_plans(service: web::Data<Arc<InstallmentService>>) -> Result<HttpResponse> {
    let plans: Vec<PlanResponse> = service
        .list_plans()
        .await?
        .into_iter()
        .map(PlanResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(plans))
}

/// GET /plans/{plan_id}
///
/// # Returns
/// - 200: Plan
/// - 404: Plan not found
pub async fn get_plan(
    service: web::Data<Arc<InstallmentService>>,
    plan_id: web::Path<String>,
) -> Result<HttpResponse> {
    let plan = service.get_plan(&plan_id).await?;

    Ok(HttpResponse::Ok().json(PlanResponse::from(plan)))
}

/// Configure plan routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plans")
            .route("", web::get().to(list_plans))
            .route("/{id}", web::get().to(get_plan)),
    );
}
