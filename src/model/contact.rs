//! 通讯录模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 联系人（对应 contacts 表，严格按所属用户隔离）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// 联系人ID
    pub id: Uuid,
    /// 所属用户ID
    pub user_id: Uuid,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// 中间名
    pub middle_name: String,
    /// 手机号
    pub phone_number: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 创建联系人
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContact {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub phone_number: String,
}

/// 更新联系人（缺省字段保持原值）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub phone_number: Option<String>,
}

/// 联系人列表查询
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAllContactsRequest {
    /// 名称/手机号模糊搜索（不区分大小写）
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// 联系人列表响应
#[derive(Debug, Clone, Serialize)]
pub struct GetAllContactsResponse {
    pub contacts: Vec<Contact>,
    pub count: i64,
}
