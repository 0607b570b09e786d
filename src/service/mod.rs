//! 业务服务

pub mod auth_service;

pub use auth_service::AuthService;
