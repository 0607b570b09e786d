//! 通讯录路由（所有操作限定在当前用户名下）

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::http::middleware::AuthUser;
use crate::http::HttpServerState;
use crate::model::{ApiResponse, CreateContact, GetAllContactsRequest, UpdateContact};

pub fn create_route() -> Router<HttpServerState> {
    Router::new()
        .route("/api/v1/contact/create", post(create_contact))
        .route("/api/v1/contact/getbyid/{id}", get(get_contact_by_id))
        .route("/api/v1/contact/getall", get(get_all_contacts))
        .route("/api/v1/contact/update/{id}", put(update_contact))
        .route("/api/v1/contact/delete/{id}", delete(delete_contact))
}

/// POST /api/v1/contact/create
async fn create_contact(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateContact>,
) -> Result<impl IntoResponse> {
    let contact = state
        .contact_store
        .create(auth_user.user_id, &req)
        .await?;

    Ok(ApiResponse::created(contact))
}

/// GET /api/v1/contact/getbyid/{id}
async fn get_contact_by_id(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let contact = state
        .contact_store
        .get_by_id(id, auth_user.user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("contact not found".to_string()))?;

    Ok(ApiResponse::ok(contact))
}

/// GET /api/v1/contact/getall?search=&page=&limit=
async fn get_all_contacts(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(req): Query<GetAllContactsRequest>,
) -> Result<impl IntoResponse> {
    let contacts = state
        .contact_store
        .get_all(auth_user.user_id, &req)
        .await?;

    Ok(ApiResponse::ok(contacts))
}

/// PUT /api/v1/contact/update/{id}
async fn update_contact(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContact>,
) -> Result<impl IntoResponse> {
    let contact = state
        .contact_store
        .update(id, auth_user.user_id, &req)
        .await?;

    Ok(ApiResponse::ok(contact))
}

/// DELETE /api/v1/contact/delete/{id}
async fn delete_contact(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .contact_store
        .delete(id, auth_user.user_id)
        .await?;

    Ok(ApiResponse::ok(id.to_string()))
}
