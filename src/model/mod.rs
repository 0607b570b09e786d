//! 数据模型

pub mod auth;
pub mod contact;
pub mod device;
pub mod response;
pub mod user;

pub use auth::*;
pub use contact::*;
pub use device::*;
pub use response::*;
pub use user::*;
