//! 用户仓库 - PostgreSQL 实现

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::model::{
    CreateDevice, Device, GetAllUsersRequest, GetAllUsersResponse, UpdateUser, User,
};
use crate::repository::{normalize_page, NewUser, UserStore};

/// 用户仓库 (PostgreSQL 实现)
#[derive(Clone)]
pub struct UserRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    phone_number: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            phone_number: r.phone_number,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// 唯一约束冲突（23505）映射为 409，其余映射为数据库错误
fn map_insert_error(e: sqlx::Error, context: &str) -> ServerError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            return ServerError::DuplicateEntry("phone number already registered".to_string());
        }
    }
    ServerError::Database(format!("{}: {}", context, e))
}

impl UserRepository {
    /// 创建新的用户仓库
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_with_device(
        &self,
        user: &NewUser,
        device: &CreateDevice,
    ) -> Result<(User, Device)> {
        // 用户行 + 首个设备行在一个事务内写入，
        // 任何一步失败整体回滚，不会留下没有设备的用户
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServerError::Database(format!("开启事务失败: {}", e)))?;

        let user_id = Uuid::new_v4();

        let user_row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, first_name, last_name, phone_number, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, first_name, last_name, phone_number, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, "创建用户失败"))?;

        let device_id = Uuid::new_v4();

        #[derive(sqlx::FromRow)]
        struct CreatedAtRow {
            created_at: DateTime<Utc>,
        }

        let device_row = sqlx::query_as::<_, CreatedAtRow>(
            r#"
            INSERT INTO devices (
                id, user_id, name, notification_key, device_type,
                os_version, app_version, remember_me, ad_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING created_at
            "#,
        )
        .bind(device_id)
        .bind(user_id)
        .bind(&device.name)
        .bind(&device.notification_key)
        .bind(device.device_type.as_str())
        .bind(&device.os_version)
        .bind(&device.app_version)
        .bind(device.remember_me)
        .bind(&device.ad_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServerError::Database(format!("创建设备失败: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| ServerError::Database(format!("提交事务失败: {}", e)))?;

        let created_device = Device {
            id: device_id,
            user_id,
            name: device.name.clone(),
            notification_key: device.notification_key.clone(),
            device_type: device.device_type,
            os_version: device.os_version.clone(),
            app_version: device.app_version.clone(),
            remember_me: device.remember_me,
            ad_id: device.ad_id.clone(),
            created_at: device_row.created_at,
        };

        Ok((user_row.into(), created_device))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, phone_number, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("查询用户失败: {}", e)))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, phone_number, created_at, updated_at
            FROM users
            WHERE phone_number = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("按手机号查询用户失败: {}", e)))?;

        Ok(row.map(Into::into))
    }

    async fn get_all(&self, req: &GetAllUsersRequest) -> Result<GetAllUsersResponse> {
        let (page, limit) = normalize_page(req.page, req.limit);
        let offset = (page - 1) * limit;

        let search_pattern = req
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        #[derive(sqlx::FromRow)]
        struct CountedUserRow {
            total: i64,
            id: Uuid,
            first_name: String,
            last_name: String,
            phone_number: String,
            created_at: DateTime<Utc>,
            updated_at: Option<DateTime<Utc>>,
        }

        let rows = sqlx::query_as::<_, CountedUserRow>(
            r#"
            SELECT
                count(id) OVER() AS total,
                id, first_name, last_name, phone_number, created_at, updated_at
            FROM users
            WHERE $1::text IS NULL
               OR first_name ILIKE $1
               OR last_name ILIKE $1
               OR phone_number ILIKE $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(&search_pattern)
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("查询用户列表失败: {}", e)))?;

        let count = rows.first().map(|r| r.total).unwrap_or(0);
        let users = rows
            .into_iter()
            .map(|r| User {
                id: r.id,
                first_name: r.first_name,
                last_name: r.last_name,
                phone_number: r.phone_number,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect();

        Ok(GetAllUsersResponse { users, count })
    }

    async fn update(&self, id: Uuid, update: &UpdateUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET first_name = $1,
                last_name = $2,
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, first_name, last_name, phone_number, created_at, updated_at
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("更新用户失败: {}", e)))?;

        row.map(Into::into)
            .ok_or_else(|| ServerError::UserNotFound(id.to_string()))
    }

    async fn update_phone_number(&self, id: Uuid, phone: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET phone_number = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(phone)
        .bind(id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_insert_error(e, "更新手机号失败"))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::UserNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // 设备、联系人、用户行在一个事务内删除，要么全删要么全留
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServerError::Database(format!("开启事务失败: {}", e)))?;

        sqlx::query("DELETE FROM devices WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServerError::Database(format!("删除用户设备失败: {}", e)))?;

        sqlx::query("DELETE FROM contacts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServerError::Database(format!("删除用户联系人失败: {}", e)))?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServerError::Database(format!("删除用户失败: {}", e)))?;

        if result.rows_affected() == 0 {
            // 用户不存在，整个事务放弃
            tx.rollback()
                .await
                .map_err(|e| ServerError::Database(format!("回滚事务失败: {}", e)))?;
            return Err(ServerError::UserNotFound(id.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| ServerError::Database(format!("提交事务失败: {}", e)))?;

        tracing::info!("用户及其设备、联系人已删除: user_id={}", id);
        Ok(())
    }
}
