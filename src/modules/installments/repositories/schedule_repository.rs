// Schedule entry persistence
//
// Implements:
// - Batch insert of a contract's schedule (inside the contract's transaction)
// - Ordered read of a contract's schedule
// - Locked lookup of the earliest pending entry for payment application
// - Status updates and cascade removal

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{Executor, MySql, MySqlConnection};

use crate::core::{AppError, Result};
use crate::modules::installments::models::{ScheduleEntry, ScheduleStatus};

/// Repository for payment_schedules database operations
pub struct ScheduleRepository;

impl ScheduleRepository {
    /// Insert all entries of a schedule on one connection
    pub async fn insert_batch(conn: &mut MySqlConnection, entries: &[ScheduleEntry]) -> Result<()> {
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO payment_schedules (
                    id, contract_id, installment_number, due_date, amount_due,
                    paid_amount, status, paid_at, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&entry.id)
            .bind(&entry.contract_id)
            .bind(entry.installment_number)
            .bind(entry.due_date)
            .bind(entry.amount_due)
            .bind(entry.paid_amount)
            .bind(entry.status.as_str())
            .bind(entry.paid_at)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Find all entries of a contract ordered by due date
    pub async fn find_by_contract<'e, E>(executor: E, contract_id: &str) -> Result<Vec<ScheduleEntry>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows = sqlx::query_as::<_, ScheduleEntryRow>(
            r#"
            SELECT
                id, contract_id, installment_number, due_date, amount_due,
                paid_amount, status, paid_at, created_at, updated_at
            FROM payment_schedules
            WHERE contract_id = ?
            ORDER BY due_date ASC, installment_number ASC
            "#,
        )
        .bind(contract_id)
        .fetch_all(executor)
        .await?;

        rows.into_iter().map(ScheduleEntry::try_from).collect()
    }

    /// Lock and return the earliest-due pending entry of a contract
    pub async fn find_oldest_pending_for_update<'e, E>(
        executor: E,
        contract_id: &str,
    ) -> Result<Option<ScheduleEntry>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let row = sqlx::query_as::<_, ScheduleEntryRow>(
            r#"
            SELECT
                id, contract_id, installment_number, due_date, amount_due,
                paid_amount, status, paid_at, created_at, updated_at
            FROM payment_schedules
            WHERE contract_id = ? AND status = 'pending'
            ORDER BY due_date ASC, installment_number ASC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(contract_id)
        .fetch_optional(executor)
        .await?;

        row.map(ScheduleEntry::try_from).transpose()
    }

    /// Count settled entries of a contract
    pub async fn count_paid<'e, E>(executor: E, contract_id: &str) -> Result<i64>
    where
        E: Executor<'e, Database = MySql>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payment_schedules WHERE contract_id = ? AND status = 'paid'",
        )
        .bind(contract_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Update status and payment details of an entry
    pub async fn update<'e, E>(executor: E, entry: &ScheduleEntry) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows_affected = sqlx::query(
            r#"
            UPDATE payment_schedules
            SET
                paid_amount = ?,
                status = ?,
                paid_at = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.paid_amount)
        .bind(entry.status.as_str())
        .bind(entry.paid_at)
        .bind(entry.updated_at)
        .bind(&entry.id)
        .execute(executor)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found("Schedule entry not found"));
        }

        Ok(())
    }

    /// Remove every entry of a contract
    pub async fn delete_by_contract<'e, E>(executor: E, contract_id: &str) -> Result<u64>
    where
        E: Executor<'e, Database = MySql>,
    {
        let result = sqlx::query("DELETE FROM payment_schedules WHERE contract_id = ?")
            .bind(contract_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Database row representation for payment_schedules table
#[derive(sqlx::FromRow)]
struct ScheduleEntryRow {
    id: String,
    contract_id: String,
    installment_number: i32,
    due_date: NaiveDate,
    amount_due: Decimal,
    paid_amount: Option<Decimal>,
    status: String,
    paid_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<ScheduleEntryRow> for ScheduleEntry {
    type Error = AppError;

    fn try_from(row: ScheduleEntryRow) -> Result<Self> {
        Ok(ScheduleEntry {
            status: ScheduleStatus::try_from(row.status)?,
            id: row.id,
            contract_id: row.contract_id,
            installment_number: row.installment_number,
            due_date: row.due_date,
            amount_due: row.amount_due,
            paid_amount: row.paid_amount,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
