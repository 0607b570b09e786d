pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod infra;
pub mod logging;
pub mod model;
pub mod repository;
pub mod service;
pub mod sms;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use http::{AuthHttpServer, HttpServerState};
pub use service::AuthService;
