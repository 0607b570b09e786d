//! 认证路由：注册、登录、换绑手机号、登出

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{delete, post},
    Extension, Router,
};

use crate::auth::validate_phone_number;
use crate::error::Result;
use crate::http::middleware::AuthUser;
use crate::http::HttpServerState;
use crate::model::{
    ApiResponse, ChangePhoneConfirmRequest, ChangePhoneRequest, LoginConfirmRequest, LoginRequest,
    RegisterConfirmRequest, RegisterRequest,
};

/// 无需认证的认证入口
pub fn public_routes() -> Router<HttpServerState> {
    Router::new()
        .route("/api/v1/user/registerrequest", post(register_request))
        .route("/api/v1/user/registerconfirm", post(register_confirm))
        .route("/api/v1/user/loginrequest", post(login_request))
        .route("/api/v1/user/loginconfirm", post(login_confirm))
}

/// 需要 Bearer 认证的认证操作
pub fn protected_routes() -> Router<HttpServerState> {
    Router::new()
        .route("/api/v1/user/sendotp", post(send_change_otp))
        .route("/api/v1/user/confirmotp", post(confirm_change_otp))
        .route("/api/v1/user/logout", delete(logout))
}

/// POST /api/v1/user/registerrequest - 下发注册验证码
async fn register_request(
    State(state): State<HttpServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    validate_phone_number(&req.phone_number)?;

    let issued = state.auth_service.register_request(&req).await?;
    Ok(ApiResponse::ok(issued))
}

/// POST /api/v1/user/registerconfirm - 校验验证码并创建用户
async fn register_confirm(
    State(state): State<HttpServerState>,
    Json(req): Json<RegisterConfirmRequest>,
) -> Result<impl IntoResponse> {
    validate_phone_number(&req.phone_number)?;

    let tokens = state.auth_service.register_confirm(&req).await?;
    Ok(ApiResponse::ok(tokens))
}

/// POST /api/v1/user/loginrequest - 下发登录验证码
async fn login_request(
    State(state): State<HttpServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    validate_phone_number(&req.phone_number)?;

    let issued = state.auth_service.login_request(&req).await?;
    Ok(ApiResponse::ok(issued))
}

/// POST /api/v1/user/loginconfirm - 校验验证码并登记设备
async fn login_confirm(
    State(state): State<HttpServerState>,
    Json(req): Json<LoginConfirmRequest>,
) -> Result<impl IntoResponse> {
    validate_phone_number(&req.phone_number)?;

    let tokens = state.auth_service.login_confirm(&req).await?;
    Ok(ApiResponse::ok(tokens))
}

/// POST /api/v1/user/sendotp - 下发换绑手机号验证码
async fn send_change_otp(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<ChangePhoneRequest>,
) -> Result<impl IntoResponse> {
    validate_phone_number(&req.phone_number)?;

    let issued = state
        .auth_service
        .change_phone_request(auth_user.user_id, &req)
        .await?;
    Ok(ApiResponse::ok(issued))
}

/// POST /api/v1/user/confirmotp - 校验验证码并更新手机号
async fn confirm_change_otp(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<ChangePhoneConfirmRequest>,
) -> Result<impl IntoResponse> {
    validate_phone_number(&req.phone_number)?;

    state
        .auth_service
        .change_phone_confirm(auth_user.user_id, &req)
        .await?;
    Ok(ApiResponse::ok("phone number updated successfully"))
}

/// DELETE /api/v1/user/logout - 删除当前凭证绑定的设备
async fn logout(
    State(state): State<HttpServerState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    state
        .auth_service
        .logout(auth_user.user_id, auth_user.device_id)
        .await?;
    Ok(ApiResponse::ok("logged out successfully"))
}
