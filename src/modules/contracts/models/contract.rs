use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::installments::models::ScheduleEntry;
use crate::modules::installments::services::PricingBreakdown;

/// Installment sales contract
///
/// `remaining_balance` always equals the sum of `amount_due` over the
/// contract's pending schedule entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    /// Human-facing reference, `CTR-YYYYMMDD-XXXXXXXX`
    pub contract_number: String,
    pub buyer_id: String,
    pub device_id: String,
    pub admin_id: Option<String>,
    pub plan_id: Option<String>,
    pub total_price: Decimal,
    pub initial_payment: Decimal,
    pub monthly_payment: Decimal,
    pub remaining_balance: Decimal,
    pub duration_months: i32,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_trade_in: bool,
    pub trade_in_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Contract lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    /// Every installment settled
    Completed,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for ContractStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::internal(format!(
                "Invalid contract status: {}",
                value
            ))),
        }
    }
}

/// Parties and dates of a new contract, resolved by the ledger
#[derive(Debug, Clone)]
pub struct NewContract {
    pub buyer_id: String,
    pub device_id: String,
    pub admin_id: Option<String>,
    pub plan_id: String,
    pub duration_months: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_trade_in: bool,
    pub trade_in_value: Decimal,
}

impl Contract {
    /// Build an active contract from resolved parties and computed pricing
    pub fn new(terms: NewContract, pricing: &PricingBreakdown) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let id = Uuid::new_v4();

        Self {
            id: id.to_string(),
            contract_number: contract_number(now.date(), &id),
            buyer_id: terms.buyer_id,
            device_id: terms.device_id,
            admin_id: terms.admin_id,
            plan_id: Some(terms.plan_id),
            total_price: pricing.total_price,
            initial_payment: pricing.initial_payment,
            monthly_payment: pricing.monthly_payment,
            remaining_balance: pricing.remaining_balance,
            duration_months: terms.duration_months,
            status: ContractStatus::Active,
            start_date: terms.start_date,
            end_date: terms.end_date,
            is_trade_in: terms.is_trade_in,
            trade_in_value: terms.trade_in_value,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }

    /// Decrease the running balance by a confirmed payment
    pub fn apply_payment(&mut self, amount: Decimal) -> Result<()> {
        if amount > self.remaining_balance {
            return Err(AppError::validation(format!(
                "Payment {} exceeds remaining balance {} of contract {}",
                amount, self.remaining_balance, self.contract_number
            )));
        }

        self.remaining_balance -= amount;
        self.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }

    /// Mark the contract completed once nothing is owed
    pub fn complete(&mut self) {
        self.status = ContractStatus::Completed;
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Administrative correction; pricing and schedule are left untouched
    pub fn apply_patch(&mut self, patch: &ContractPatch) -> Result<()> {
        let start_date = patch.start_date.unwrap_or(self.start_date);
        let end_date = patch.end_date.unwrap_or(self.end_date);

        if end_date < start_date {
            return Err(AppError::validation(format!(
                "End date {} cannot precede start date {}",
                end_date, start_date
            )));
        }

        if patch.status == Some(ContractStatus::Completed) && !self.remaining_balance.is_zero() {
            return Err(AppError::validation(format!(
                "Contract {} still owes {} and cannot be marked completed",
                self.contract_number, self.remaining_balance
            )));
        }

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ref admin_id) = patch.admin_id {
            self.admin_id = Some(admin_id.clone());
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }
}

fn contract_number(date: NaiveDate, id: &Uuid) -> String {
    let simple = id.simple().to_string();
    format!(
        "CTR-{}-{}",
        date.format("%Y%m%d"),
        simple[..8].to_uppercase()
    )
}

/// Optional trade-in supplied at purchase time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInRequest {
    pub estimated_value: Decimal,
}

/// Request body for POST /contracts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContractRequest {
    pub buyer_id: String,
    pub device_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub trade_in: Option<TradeInRequest>,
    /// Defaults to today (UTC)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Request body for PATCH /contracts/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractPatch {
    #[serde(default)]
    pub status: Option<ContractStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub admin_id: Option<String>,
}

/// API representation of a contract; money as decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractResponse {
    pub id: String,
    pub contract_number: String,
    pub buyer_id: String,
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub total_price: String,
    pub initial_payment: String,
    pub monthly_payment: String,
    pub remaining_balance: String,
    pub duration_months: i32,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub is_trade_in: bool,
    pub trade_in_value: String,
    pub created_at: String,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id,
            contract_number: contract.contract_number,
            buyer_id: contract.buyer_id,
            device_id: contract.device_id,
            admin_id: contract.admin_id,
            plan_id: contract.plan_id,
            total_price: contract.total_price.to_string(),
            initial_payment: contract.initial_payment.to_string(),
            monthly_payment: contract.monthly_payment.to_string(),
            remaining_balance: contract.remaining_balance.to_string(),
            duration_months: contract.duration_months,
            status: contract.status.to_string(),
            start_date: contract.start_date.to_string(),
            end_date: contract.end_date.to_string(),
            is_trade_in: contract.is_trade_in,
            trade_in_value: contract.trade_in_value.to_string(),
            created_at: contract.created_at.to_string(),
        }
    }
}

/// API representation of a schedule entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntryResponse {
    pub id: String,
    pub installment_number: i32,
    pub due_date: String,
    pub amount_due: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

impl From<ScheduleEntry> for ScheduleEntryResponse {
    fn from(entry: ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            installment_number: entry.installment_number,
            due_date: entry.due_date.to_string(),
            amount_due: entry.amount_due.to_string(),
            paid_amount: entry.paid_amount.map(|a| a.to_string()),
            status: entry.status.to_string(),
            paid_at: entry.paid_at.map(|dt| dt.to_string()),
        }
    }
}

/// Result of contract creation: the contract, its pricing and full schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSummary {
    pub contract: ContractResponse,
    pub adjusted_price: String,
    pub schedule: Vec<ScheduleEntryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_payment_id: Option<String>,
}

/// GET /contracts/{id} payload: contract plus its schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDetails {
    #[serde(flatten)]
    pub contract: ContractResponse,
    pub schedule: Vec<ScheduleEntryResponse>,
}
