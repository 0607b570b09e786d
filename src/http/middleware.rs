//! 认证中间件
//!
//! 校验 `Authorization: Bearer <token>`，通过后把用户信息注入
//! request extensions；缺失/格式错误/签名无效都在 handler 之前
//! 以 401 拒绝。

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::http::HttpServerState;

/// 当前请求的认证用户（从 Bearer token 声明中提取）
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    /// 凭证绑定的设备（登录/注册签发的 token 都有）
    pub device_id: Option<Uuid>,
}

/// Bearer token 校验中间件
pub async fn require_auth(
    State(state): State<HttpServerState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::Unauthorized("missing authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ServerError::Unauthorized("invalid authorization header format".to_string())
    })?;

    let claims = state.jwt_service.verify_token(token)?;

    let auth_user = AuthUser {
        user_id: claims.user_id()?,
        role: claims.role.clone(),
        device_id: claims.device_uuid(),
    };

    tracing::debug!(
        "✅ 认证通过: user_id={}, device_id={:?}",
        auth_user.user_id,
        auth_user.device_id
    );

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}
