//! Application assembly: services over a ledger store, and route wiring.

use std::sync::Arc;

use actix_web::web;

use crate::middleware::{json_error_handler, path_error_handler, query_error_handler};
use crate::modules::contracts::{self, ContractService};
use crate::modules::health;
use crate::modules::installments::{self, InstallmentService};
use crate::modules::notifications::NotificationDispatcher;
use crate::modules::payments::{self, PaymentService};
use crate::storage::LedgerStore;

/// Shared services handed to every HTTP worker
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn LedgerStore>,
    pub contracts: Arc<ContractService>,
    pub payments: Arc<PaymentService>,
    pub installments: Arc<InstallmentService>,
}

impl AppServices {
    pub fn new(store: Arc<dyn LedgerStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            contracts: Arc::new(ContractService::new(store.clone(), notifications.clone())),
            payments: Arc::new(PaymentService::new(store.clone(), notifications)),
            installments: Arc::new(InstallmentService::new(store.clone())),
            store,
        }
    }
}

/// Register app data, extractor error handlers and every route
pub fn configure_app(cfg: &mut web::ServiceConfig, services: &AppServices) {
    cfg.app_data(web::Data::new(services.store.clone()))
        .app_data(web::Data::new(services.contracts.clone()))
        .app_data(web::Data::new(services.payments.clone()))
        .app_data(web::Data::new(services.installments.clone()))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .configure(health::controllers::configure)
        .configure(installments::controllers::configure)
        .configure(contracts::controllers::configure)
        .configure(payments::controllers::configure);
}
