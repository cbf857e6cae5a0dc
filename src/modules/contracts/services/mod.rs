pub mod contract_service;

pub use contract_service::{ContractService, MAX_PAGE_SIZE};
