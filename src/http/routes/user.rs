//! 用户 CRUD 路由

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::{delete, get, put},
    Router,
};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::http::HttpServerState;
use crate::model::{ApiResponse, GetAllUsersRequest, UpdateUser};

pub fn create_route() -> Router<HttpServerState> {
    Router::new()
        .route("/api/v1/user/getbyid/{id}", get(get_user_by_id))
        .route("/api/v1/user/getall", get(get_all_users))
        .route("/api/v1/user/update/{id}", put(update_user))
        .route("/api/v1/user/delete/{id}", delete(delete_user))
}

/// GET /api/v1/user/getbyid/{id}
async fn get_user_by_id(
    State(state): State<HttpServerState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_store
        .get_by_id(id)
        .await?
        .ok_or_else(|| ServerError::UserNotFound(id.to_string()))?;

    Ok(ApiResponse::ok(user))
}

/// GET /api/v1/user/getall?search=&page=&limit=
async fn get_all_users(
    State(state): State<HttpServerState>,
    Query(req): Query<GetAllUsersRequest>,
) -> Result<impl IntoResponse> {
    let users = state.user_store.get_all(&req).await?;
    Ok(ApiResponse::ok(users))
}

/// PUT /api/v1/user/update/{id}
async fn update_user(
    State(state): State<HttpServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<impl IntoResponse> {
    let user = state.user_store.update(id, &req).await?;
    Ok(ApiResponse::ok(user))
}

/// DELETE /api/v1/user/delete/{id} - 级联删除设备与联系人
async fn delete_user(
    State(state): State<HttpServerState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.user_store.delete(id).await?;
    Ok(ApiResponse::ok(id.to_string()))
}
