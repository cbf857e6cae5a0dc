pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Contract, ContractStatus, ContractSummary, CreateContractRequest};
pub use repositories::ContractRepository;
pub use services::ContractService;
