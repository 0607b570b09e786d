//! 用户模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户（对应 users 表）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// 用户ID
    pub id: Uuid,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// 手机号（全局唯一）
    pub phone_number: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 创建用户（注册请求携带的资料）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
}

/// 更新用户资料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: String,
}

/// 用户列表查询
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAllUsersRequest {
    /// 名称/手机号模糊搜索（不区分大小写）
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// 用户列表响应
#[derive(Debug, Clone, Serialize)]
pub struct GetAllUsersResponse {
    pub users: Vec<User>,
    pub count: i64,
}
