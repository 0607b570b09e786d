//! 认证组件：JWT 签发/验证、验证码生成、手机号校验

pub mod jwt_service;
pub mod otp;
pub mod phone;

pub use jwt_service::{JwtService, SessionClaims};
pub use otp::{generate_identifier, generate_otp};
pub use phone::validate_phone_number;
