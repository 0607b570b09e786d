//! HTTP 服务：路由、认证中间件、服务器装配

pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{AuthHttpServer, HttpServerState};
