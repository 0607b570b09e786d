//! 联系人仓库 - PostgreSQL 实现

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::model::{
    Contact, CreateContact, GetAllContactsRequest, GetAllContactsResponse, UpdateContact,
};
use crate::repository::{normalize_page, ContactStore};

/// 联系人仓库 (PostgreSQL 实现)
#[derive(Clone)]
pub struct ContactRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    middle_name: String,
    phone_number: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ContactRow> for Contact {
    fn from(r: ContactRow) -> Self {
        Contact {
            id: r.id,
            user_id: r.user_id,
            first_name: r.first_name,
            last_name: r.last_name,
            middle_name: r.middle_name,
            phone_number: r.phone_number,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const CONTACT_COLUMNS: &str =
    "id, user_id, first_name, last_name, middle_name, phone_number, created_at, updated_at";

impl ContactRepository {
    /// 创建新的联系人仓库
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for ContactRepository {
    async fn create(&self, user_id: Uuid, contact: &CreateContact) -> Result<Contact> {
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r#"
            INSERT INTO contacts (
                id, user_id, first_name, last_name, middle_name, phone_number, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.middle_name)
        .bind(&contact.phone_number)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("创建联系人失败: {}", e)))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Contact>> {
        // 所属用户不匹配等同于不存在，绝不返回他人的联系人
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE id = $1 AND user_id = $2
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("查询联系人失败: {}", e)))?;

        Ok(row.map(Into::into))
    }

    async fn get_all(
        &self,
        user_id: Uuid,
        req: &GetAllContactsRequest,
    ) -> Result<GetAllContactsResponse> {
        let (page, limit) = normalize_page(req.page, req.limit);
        let offset = (page - 1) * limit;

        let search_pattern = req
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        #[derive(sqlx::FromRow)]
        struct CountedContactRow {
            total: i64,
            id: Uuid,
            user_id: Uuid,
            first_name: String,
            last_name: String,
            middle_name: String,
            phone_number: String,
            created_at: DateTime<Utc>,
            updated_at: Option<DateTime<Utc>>,
        }

        let rows = sqlx::query_as::<_, CountedContactRow>(
            r#"
            SELECT
                count(id) OVER() AS total,
                id, user_id, first_name, last_name, middle_name, phone_number,
                created_at, updated_at
            FROM contacts
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR first_name ILIKE $2
                   OR last_name ILIKE $2
                   OR phone_number ILIKE $2)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(&search_pattern)
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("查询联系人列表失败: {}", e)))?;

        let count = rows.first().map(|r| r.total).unwrap_or(0);
        let contacts = rows
            .into_iter()
            .map(|r| Contact {
                id: r.id,
                user_id: r.user_id,
                first_name: r.first_name,
                last_name: r.last_name,
                middle_name: r.middle_name,
                phone_number: r.phone_number,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect();

        Ok(GetAllContactsResponse { contacts, count })
    }

    async fn update(&self, id: Uuid, user_id: Uuid, update: &UpdateContact) -> Result<Contact> {
        // 缺省字段保持原值（COALESCE）
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r#"
            UPDATE contacts
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                middle_name = COALESCE($3, middle_name),
                phone_number = COALESCE($4, phone_number),
                updated_at = NOW()
            WHERE id = $5 AND user_id = $6
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.middle_name)
        .bind(&update.phone_number)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| ServerError::Database(format!("更新联系人失败: {}", e)))?;

        row.map(Into::into)
            .ok_or_else(|| ServerError::NotFound("contact not found".to_string()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| ServerError::Database(format!("删除联系人失败: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("contact not found".to_string()));
        }

        Ok(())
    }
}
