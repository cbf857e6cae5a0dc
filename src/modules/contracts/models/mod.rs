pub mod contract;

pub use contract::{
    Contract, ContractDetails, ContractPatch, ContractResponse, ContractStatus, ContractSummary,
    CreateContractRequest, NewContract, ScheduleEntryResponse, TradeInRequest,
};
