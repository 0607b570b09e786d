use std::error::Error as StdError;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::model::device::Device;

/// 服务器错误类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerError {
    /// 内部错误
    Internal(String),
    /// 验证错误
    Validation(String),
    /// 数据库错误
    Database(String),
    /// 缓存错误
    Cache(String),
    /// 错误请求
    BadRequest(String),
    /// 资源未找到
    NotFound(String),
    /// 用户未找到
    UserNotFound(String),
    /// 无效令牌
    InvalidToken,
    /// 未授权
    Unauthorized(String),
    /// 禁止访问
    Forbidden(String),
    /// 重复条目
    DuplicateEntry(String),
    /// 验证码已过期或不存在
    OtpExpired,
    /// 验证码不匹配
    OtpMismatch,
    /// 关联标识不匹配
    IdentifierMismatch,
    /// 设备数量超出上限（携带现有设备列表，供客户端选择删除）
    DeviceLimitExceeded(Vec<Device>),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ServerError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ServerError::Database(msg) => write!(f, "Database error: {}", msg),
            ServerError::Cache(msg) => write!(f, "Cache error: {}", msg),
            ServerError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::UserNotFound(id) => write!(f, "User not found: {}", id),
            ServerError::InvalidToken => write!(f, "Invalid token"),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServerError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServerError::DuplicateEntry(msg) => write!(f, "Duplicate entry: {}", msg),
            ServerError::OtpExpired => write!(f, "OTP code not found or expired"),
            ServerError::OtpMismatch => write!(f, "Incorrect OTP code"),
            ServerError::IdentifierMismatch => write!(f, "Identifier mismatch"),
            ServerError::DeviceLimitExceeded(_) => write!(
                f,
                "Device limit exceeded, please delete one of your devices to proceed"
            ),
        }
    }
}

impl StdError for ServerError {}

impl ServerError {
    /// 对应的 HTTP 状态码
    ///
    /// OTP 校验失败统一映射为 400，401 只用于 Bearer 凭证问题
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_)
            | ServerError::BadRequest(_)
            | ServerError::OtpExpired
            | ServerError::OtpMismatch
            | ServerError::IdentifierMismatch => StatusCode::BAD_REQUEST,
            ServerError::InvalidToken | ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) | ServerError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::DuplicateEntry(_) | ServerError::DeviceLimitExceeded(_) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 对外暴露的错误消息
    ///
    /// 存储/缓存/内部错误的原始文本只进日志，不回给客户端
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Internal(_) => "internal server error".to_string(),
            ServerError::Database(_) => "storage error".to_string(),
            ServerError::Cache(_) => "cache error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("内部错误: {}", self);
        }

        // 错误同样走统一响应信封：{status, description, error}
        let error_response = ErrorResponse::new(&self);
        let body = serde_json::json!({
            "status": status_code.as_u16(),
            "description": error_response.message,
            "error": {
                "code": error_response.code,
                "details": error_response.details,
                "timestamp": error_response.timestamp,
            },
        });
        (status_code, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ServerError>;

/// 错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// 成功
    Success = 0,
    /// 内部错误
    Internal = 1000,
    /// 验证错误
    Validation = 1001,
    /// 用户未找到
    UserNotFound = 1002,
    /// 数据库错误
    Database = 2000,
    /// 缓存错误
    Cache = 2001,
    /// 无效令牌
    InvalidToken = 3000,
    /// 未授权
    Unauthorized = 3001,
    /// 禁止访问
    Forbidden = 3002,
    /// 验证码已过期
    OtpExpired = 4000,
    /// 验证码不匹配
    OtpMismatch = 4001,
    /// 关联标识不匹配
    IdentifierMismatch = 4002,
    /// 设备数量超限
    DeviceLimitExceeded = 4003,
    /// 错误请求
    BadRequest = 5000,
    /// 资源未找到
    NotFound = 5001,
    /// 重复条目
    DuplicateEntry = 5002,
}

impl From<&ServerError> for ErrorCode {
    fn from(error: &ServerError) -> Self {
        match error {
            ServerError::Internal(_) => ErrorCode::Internal,
            ServerError::Validation(_) => ErrorCode::Validation,
            ServerError::Database(_) => ErrorCode::Database,
            ServerError::Cache(_) => ErrorCode::Cache,
            ServerError::BadRequest(_) => ErrorCode::BadRequest,
            ServerError::NotFound(_) => ErrorCode::NotFound,
            ServerError::UserNotFound(_) => ErrorCode::UserNotFound,
            ServerError::InvalidToken => ErrorCode::InvalidToken,
            ServerError::Unauthorized(_) => ErrorCode::Unauthorized,
            ServerError::Forbidden(_) => ErrorCode::Forbidden,
            ServerError::DuplicateEntry(_) => ErrorCode::DuplicateEntry,
            ServerError::OtpExpired => ErrorCode::OtpExpired,
            ServerError::OtpMismatch => ErrorCode::OtpMismatch,
            ServerError::IdentifierMismatch => ErrorCode::IdentifierMismatch,
            ServerError::DeviceLimitExceeded(_) => ErrorCode::DeviceLimitExceeded,
        }
    }
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: ErrorCode,
    /// 错误消息
    pub message: String,
    /// 详细信息
    pub details: Option<serde_json::Value>,
    /// 时间戳
    pub timestamp: u64,
}

impl ErrorResponse {
    /// 创建错误响应
    pub fn new(error: &ServerError) -> Self {
        // 设备超限时把现有设备列表放入 details
        let details = match error {
            ServerError::DeviceLimitExceeded(devices) => serde_json::to_value(devices).ok(),
            _ => None,
        };

        Self {
            code: ErrorCode::from(error),
            message: error.public_message(),
            details,
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_errors_map_to_bad_request() {
        assert_eq!(ServerError::OtpExpired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::OtpMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::IdentifierMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_bearer_errors_map_to_unauthorized() {
        assert_eq!(
            ServerError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::Unauthorized("missing authorization header".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_text_is_not_exposed() {
        let err = ServerError::Database("connection refused at 10.0.0.3:5432".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("10.0.0.3"));
    }

    #[test]
    fn test_device_limit_carries_device_list() {
        let resp = ErrorResponse::new(&ServerError::DeviceLimitExceeded(vec![]));
        assert_eq!(resp.code, ErrorCode::DeviceLimitExceeded);
        assert!(resp.details.is_some());
    }
}
