// Payment persistence
//
// Payment rows carry no buyer; buyer and contract number come from a join
// with contracts when building read views.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{Executor, MySql};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::payments::models::{Payment, PaymentStatus, PaymentView};

const VIEW_SELECT: &str = r#"
    SELECT
        p.id, p.contract_id, p.schedule_entry_id, p.amount, p.method, p.status,
        p.failure_reason, p.payment_date, p.created_at, p.updated_at,
        c.contract_number, c.buyer_id
    FROM payments p
    INNER JOIN contracts c ON c.id = p.contract_id
"#;

/// Repository for payment database operations
pub struct PaymentRepository;

impl PaymentRepository {
    pub async fn insert<'e, E>(executor: E, payment: &Payment) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, contract_id, schedule_entry_id, amount, method, status,
                failure_reason, payment_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.contract_id)
        .bind(&payment.schedule_entry_id)
        .bind(payment.amount)
        .bind(&payment.method)
        .bind(payment.status.to_string())
        .bind(&payment.failure_reason)
        .bind(payment.payment_date)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Payment>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT
                id, contract_id, schedule_entry_id, amount, method, status,
                failure_reason, payment_date, created_at, updated_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        row.map(Payment::try_from).transpose()
    }

    /// Load and lock a payment row before a status transition
    pub async fn find_by_id_for_update<'e, E>(executor: E, id: &str) -> Result<Option<Payment>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT
                id, contract_id, schedule_entry_id, amount, method, status,
                failure_reason, payment_date, created_at, updated_at
            FROM payments
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        row.map(Payment::try_from).transpose()
    }

    pub async fn update<'e, E>(executor: E, payment: &Payment) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows_affected = sqlx::query(
            r#"
            UPDATE payments
            SET
                schedule_entry_id = ?,
                status = ?,
                failure_reason = ?,
                payment_date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&payment.schedule_entry_id)
        .bind(payment.status.to_string())
        .bind(&payment.failure_reason)
        .bind(payment.payment_date)
        .bind(payment.updated_at)
        .bind(&payment.id)
        .execute(executor)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!(
                "Payment '{}' not found",
                payment.id
            )));
        }

        Ok(())
    }

    pub async fn delete_by_contract<'e, E>(executor: E, contract_id: &str) -> Result<u64>
    where
        E: Executor<'e, Database = MySql>,
    {
        let result = sqlx::query("DELETE FROM payments WHERE contract_id = ?")
            .bind(contract_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Payments of one contract, newest first
    pub async fn find_views_by_contract<'e, E>(
        executor: E,
        contract_id: &str,
    ) -> Result<Vec<PaymentView>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let query = format!(
            "{} WHERE p.contract_id = ? ORDER BY p.created_at DESC, p.id",
            VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, PaymentViewRow>(&query)
            .bind(contract_id)
            .fetch_all(executor)
            .await?;

        rows.into_iter().map(PaymentView::try_from).collect()
    }

    /// Payments across every contract of a buyer, optionally filtered by status
    pub async fn find_views_by_buyer<'e, E>(
        executor: E,
        buyer_id: &str,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<PaymentView>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let status = status.map(|s| s.to_string());
        let query = format!(
            "{} WHERE c.buyer_id = ? AND (? IS NULL OR p.status = ?) \
             ORDER BY p.created_at DESC, p.id",
            VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, PaymentViewRow>(&query)
            .bind(buyer_id)
            .bind(&status)
            .bind(&status)
            .fetch_all(executor)
            .await?;

        rows.into_iter().map(PaymentView::try_from).collect()
    }
}

/// Database row representation for the payments table
#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: String,
    contract_id: String,
    schedule_entry_id: Option<String>,
    amount: Decimal,
    method: String,
    status: String,
    failure_reason: Option<String>,
    payment_date: NaiveDateTime,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
struct PaymentViewRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    contract_number: String,
    buyer_id: String,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        let status = PaymentStatus::from_str(&row.status).map_err(AppError::Internal)?;

        Ok(Payment {
            id: row.id,
            contract_id: row.contract_id,
            schedule_entry_id: row.schedule_entry_id,
            amount: row.amount,
            method: row.method,
            status,
            failure_reason: row.failure_reason,
            payment_date: row.payment_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<PaymentViewRow> for PaymentView {
    type Error = AppError;

    fn try_from(row: PaymentViewRow) -> Result<Self> {
        let payment = Payment::try_from(row.payment)?;
        Ok(PaymentView::new(payment, row.contract_number, row.buyer_id))
    }
}
