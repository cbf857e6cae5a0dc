// MySQL persistence for contracts
//
// Reads run against any executor (pool or open transaction); writes are only
// issued from inside a ledger transaction.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{Executor, MySql};

use crate::core::{AppError, Result};
use crate::modules::contracts::models::{Contract, ContractStatus};

const CONTRACT_COLUMNS: &str = r#"
    id, contract_number, buyer_id, device_id, admin_id, plan_id,
    total_price, initial_payment, monthly_payment, remaining_balance,
    duration_months, status, start_date, end_date, is_trade_in,
    trade_in_value, created_at, updated_at
"#;

/// Repository for contract database operations
pub struct ContractRepository;

impl ContractRepository {
    /// Insert a new contract row
    pub async fn insert<'e, E>(executor: E, contract: &Contract) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, contract_number, buyer_id, device_id, admin_id, plan_id,
                total_price, initial_payment, monthly_payment, remaining_balance,
                duration_months, status, start_date, end_date, is_trade_in,
                trade_in_value, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contract.id)
        .bind(&contract.contract_number)
        .bind(&contract.buyer_id)
        .bind(&contract.device_id)
        .bind(&contract.admin_id)
        .bind(&contract.plan_id)
        .bind(contract.total_price)
        .bind(contract.initial_payment)
        .bind(contract.monthly_payment)
        .bind(contract.remaining_balance)
        .bind(contract.duration_months)
        .bind(contract.status.as_str())
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.is_trade_in)
        .bind(contract.trade_in_value)
        .bind(contract.created_at)
        .bind(contract.updated_at)
        .execute(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::conflict(format!(
                        "Contract '{}' already exists",
                        contract.contract_number
                    ));
                }
            }
            AppError::Database(e)
        })?;

        Ok(())
    }

    /// Find a contract by ID
    pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Contract>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let query = format!("SELECT {} FROM contracts WHERE id = ?", CONTRACT_COLUMNS);
        let row = sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        row.map(Contract::try_from).transpose()
    }

    /// Find and lock a contract row (SELECT ... FOR UPDATE)
    pub async fn find_by_id_for_update<'e, E>(executor: E, id: &str) -> Result<Option<Contract>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let query = format!(
            "SELECT {} FROM contracts WHERE id = ? FOR UPDATE",
            CONTRACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        row.map(Contract::try_from).transpose()
    }

    /// List contracts, newest first
    pub async fn list<'e, E>(executor: E, limit: i64, offset: i64) -> Result<Vec<Contract>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let query = format!(
            "SELECT {} FROM contracts ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            CONTRACT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ContractRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;

        rows.into_iter().map(Contract::try_from).collect()
    }

    /// Persist balance, status, dates and admin of a contract
    pub async fn update<'e, E>(executor: E, contract: &Contract) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows_affected = sqlx::query(
            r#"
            UPDATE contracts
            SET
                admin_id = ?,
                remaining_balance = ?,
                status = ?,
                start_date = ?,
                end_date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&contract.admin_id)
        .bind(contract.remaining_balance)
        .bind(contract.status.as_str())
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.updated_at)
        .bind(&contract.id)
        .execute(executor)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!(
                "Contract '{}' not found",
                contract.id
            )));
        }

        Ok(())
    }

    /// Delete a contract row; dependent rows must be removed first
    pub async fn delete<'e, E>(executor: E, id: &str) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows_affected = sqlx::query("DELETE FROM contracts WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Contract '{}' not found", id)));
        }

        Ok(())
    }
}

/// Database row representation for the contracts table
#[derive(sqlx::FromRow)]
struct ContractRow {
    id: String,
    contract_number: String,
    buyer_id: String,
    device_id: String,
    admin_id: Option<String>,
    plan_id: Option<String>,
    total_price: Decimal,
    initial_payment: Decimal,
    monthly_payment: Decimal,
    remaining_balance: Decimal,
    duration_months: i32,
    status: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_trade_in: bool,
    trade_in_value: Decimal,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<ContractRow> for Contract {
    type Error = AppError;

    fn try_from(row: ContractRow) -> Result<Self> {
        Ok(Contract {
            status: ContractStatus::try_from(row.status)?,
            id: row.id,
            contract_number: row.contract_number,
            buyer_id: row.buyer_id,
            device_id: row.device_id,
            admin_id: row.admin_id,
            plan_id: row.plan_id,
            total_price: row.total_price,
            initial_payment: row.initial_payment,
            monthly_payment: row.monthly_payment,
            remaining_balance: row.remaining_balance,
            duration_months: row.duration_months,
            start_date: row.start_date,
            end_date: row.end_date,
            is_trade_in: row.is_trade_in,
            trade_in_value: row.trade_in_value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
