//! HTTP 路由模块
//!
//! 路由结构（统一前缀 /api/v1）：
//! - `/api/v1/user/*`    - 注册/登录/换绑/登出 + 用户 CRUD
//! - `/api/v1/contact/*` - 通讯录（按用户隔离）
//! - `/api/v1/device/*`  - 设备列表/删除（remove 为未认证清理通道）
//! - `/metrics`          - Prometheus 抓取端点

pub mod auth;
pub mod contact;
pub mod device;
pub mod metrics;
pub mod user;

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::http::middleware::require_auth;
use crate::http::HttpServerState;

/// 创建所有路由
pub fn create_routes(state: HttpServerState) -> Router {
    // 无需认证：注册/登录四个入口、未认证设备清理、指标
    let public = Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .merge(auth::public_routes())
        .merge(device::public_routes());

    // Bearer 认证保护的路由
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(user::create_route())
        .merge(contact::create_route())
        .merge(device::protected_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
