//! 设备路由

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Extension, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::http::middleware::AuthUser;
use crate::http::HttpServerState;
use crate::model::ApiResponse;

/// 需要 Bearer 认证的设备操作
pub fn protected_routes() -> Router<HttpServerState> {
    Router::new()
        .route("/api/v1/device/list", get(list_devices))
        .route("/api/v1/device/delete/{id}", delete(delete_device))
}

/// 未认证的清理通道
pub fn public_routes() -> Router<HttpServerState> {
    Router::new().route("/api/v1/device/remove/{id}", delete(remove_device))
}

/// GET /api/v1/device/list - 当前用户的设备列表
async fn list_devices(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let devices = state.device_store.get_all(auth_user.user_id).await?;
    Ok(ApiResponse::ok(devices))
}

/// DELETE /api/v1/device/delete/{id} - 删除当前用户名下的设备
async fn delete_device(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.device_store.delete(id, auth_user.user_id).await?;
    Ok(ApiResponse::ok(id.to_string()))
}

/// DELETE /api/v1/device/remove/{id} - 无条件移除设备（清理用）
async fn remove_device(
    State(state): State<HttpServerState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.device_store.remove(id).await?;
    Ok(ApiResponse::ok(id.to_string()))
}
