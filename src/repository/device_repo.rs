//! 设备仓库 - PostgreSQL 实现

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::model::{CreateDevice, Device, DeviceType};
use crate::repository::DeviceStore;

/// 设备仓库 (PostgreSQL 实现)
#[derive(Clone)]
pub struct DeviceRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    notification_key: String,
    device_type: String,
    os_version: String,
    app_version: String,
    remember_me: bool,
    ad_id: String,
    created_at: DateTime<Utc>,
}

impl From<DeviceRow> for Device {
    fn from(r: DeviceRow) -> Self {
        Device {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            notification_key: r.notification_key,
            // device_type 在库里是 varchar，读出时统一走 from_str
            device_type: DeviceType::from_str(&r.device_type),
            os_version: r.os_version,
            app_version: r.app_version,
            remember_me: r.remember_me,
            ad_id: r.ad_id,
            created_at: r.created_at,
        }
    }
}

const DEVICE_COLUMNS: &str = "id, user_id, name, notification_key, device_type, \
     os_version, app_version, remember_me, ad_id, created_at";

impl DeviceRepository {
    /// 创建新的设备仓库
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for DeviceRepository {
    async fn insert(&self, user_id: Uuid, device: &CreateDevice) -> Result<Device> {
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            r#"
            INSERT INTO devices (
                id, user_id, name, notification_key, device_type,
                os_version, app_version, remember_me, ad_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {DEVICE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(&device.name)
        .bind(&device.notification_key)
        .bind(device.device_type.as_str())
        .bind(&device.os_version)
        .bind(&device.app_version)
        .bind(device.remember_me)
        .bind(&device.ad_id)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("创建设备失败: {}", e)))?;

        Ok(row.into())
    }

    async fn get_all(&self, user_id: Uuid) -> Result<Vec<Device>> {
        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM devices
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("查询设备列表失败: {}", e)))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Device>> {
        // 所属用户不匹配等同于不存在
        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM devices
            WHERE id = $1 AND user_id = $2
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("查询设备失败: {}", e)))?;

        Ok(row.map(Into::into))
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| ServerError::Database(format!("统计设备数失败: {}", e)))?;

        Ok(row.0)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| ServerError::Database(format!("删除设备失败: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("device not found".to_string()));
        }

        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| ServerError::Database(format!("移除设备失败: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("device not found".to_string()));
        }

        Ok(())
    }
}
