use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{Executor, MySql};

use crate::core::Result;
use crate::modules::installments::models::InstallmentPlan;

/// Read access to the installment plan catalog
pub struct PlanRepository;

impl PlanRepository {
    pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<InstallmentPlan>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, name, months, markup_percent, first_payment_percent, created_at
            FROM installment_plans
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(InstallmentPlan::from))
    }

    /// All plans, shortest duration first
    pub async fn list<'e, E>(executor: E) -> Result<Vec<InstallmentPlan>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, name, months, markup_percent, first_payment_percent, created_at
            FROM installment_plans
            ORDER BY months ASC, name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(InstallmentPlan::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: String,
    name: String,
    months: i32,
    markup_percent: Decimal,
    first_payment_percent: Decimal,
    created_at: NaiveDateTime,
}

impl From<PlanRow> for InstallmentPlan {
    fn from(row: PlanRow) -> Self {
        InstallmentPlan {
            id: row.id,
            name: row.name,
            months: row.months,
            markup_percent: row.markup_percent,
            first_payment_percent: row.first_payment_percent,
            created_at: row.created_at,
        }
    }
}
