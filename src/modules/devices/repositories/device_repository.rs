use rust_decimal::Decimal;
use sqlx::{Executor, MySql};

use crate::core::{AppError, Result};
use crate::modules::devices::models::{Device, DeviceStatus};

/// Device registry access used by the ledger
pub struct DeviceRepository;

impl DeviceRepository {
    /// Load and lock a device row so concurrent buyers are serialized
    pub async fn find_for_update<'e, E>(executor: E, id: &str) -> Result<Option<Device>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let row = sqlx::query_as::<_, DeviceRow>(
            "SELECT id, name, base_price, status FROM devices WHERE id = ? FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        row.map(Device::try_from).transpose()
    }

    pub async fn update_status<'e, E>(executor: E, id: &str, status: DeviceStatus) -> Result<()>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows_affected =
            sqlx::query("UPDATE devices SET status = ?, updated_at = NOW() WHERE id = ?")
                .bind(status.as_str())
                .bind(id)
                .execute(executor)
                .await?
                .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Device '{}' not found", id)));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: String,
    name: String,
    base_price: Option<Decimal>,
    status: String,
}

impl TryFrom<DeviceRow> for Device {
    type Error = AppError;

    fn try_from(row: DeviceRow) -> Result<Self> {
        Ok(Device {
            status: DeviceStatus::try_from(row.status)?,
            id: row.id,
            name: row.name,
            base_price: row.base_price,
        })
    }
}
