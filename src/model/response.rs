//! 统一响应信封
//!
//! 所有接口（成功与失败）都返回 `{status, description, data?, error?}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::config;

/// 统一响应信封
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// HTTP 状态码
    pub status: u16,
    /// 人类可读描述
    pub description: String,
    /// 业务数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 错误详情
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

/// 根据状态码段选择描述文案
fn description_for(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => config::ERR_INFORMATION,
        200..=299 => config::SUCCESS,
        300..=399 => config::ERR_REDIRECTION,
        400..=499 => config::ERR_BADREQUEST,
        _ => config::ERR_INTERNAL_SERVER,
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn ok(data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, data)
    }

    /// 创建成功响应（201）
    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::CREATED, data)
    }

    /// 指定状态码的响应
    pub fn with_status(status: StatusCode, data: T) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                status: status.as_u16(),
                description: description_for(status).to_string(),
                data: Some(data),
                error: None,
            }),
        )
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let (status, Json(body)) = ApiResponse::ok("done");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, 200);
        assert_eq!(body.description, config::SUCCESS);
        assert_eq!(body.data, Some("done"));
        assert!(body.error.is_none());
    }

    #[test]
    fn test_description_by_status_class() {
        assert_eq!(description_for(StatusCode::CREATED), config::SUCCESS);
        assert_eq!(description_for(StatusCode::CONFLICT), config::ERR_BADREQUEST);
        assert_eq!(
            description_for(StatusCode::INTERNAL_SERVER_ERROR),
            config::ERR_INTERNAL_SERVER
        );
    }
}
