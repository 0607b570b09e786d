//! 认证流程的请求/响应与临时挑战载荷

use serde::{Deserialize, Serialize};

use crate::model::device::CreateDevice;
use crate::model::user::CreateUser;

/// 注册请求（发送验证码）
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub user: CreateUser,
}

/// 注册确认
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterConfirmRequest {
    pub phone_number: String,
    pub otp: String,
    pub identifier: String,
    pub device_info: CreateDevice,
}

/// 登录请求（发送验证码）
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
}

/// 登录确认
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfirmRequest {
    pub phone_number: String,
    pub otp: String,
    pub identifier: String,
    pub device_info: CreateDevice,
}

/// 换绑手机号请求（发送验证码到新号码）
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePhoneRequest {
    pub phone_number: String,
}

/// 换绑手机号确认
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePhoneConfirmRequest {
    pub phone_number: String,
    pub otp: String,
}

/// 验证码已下发（message 含验证码文案，identifier 为本次挑战的关联标识）
#[derive(Debug, Clone, Serialize)]
pub struct OtpIssued {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// 登录/注册成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// 待确认的注册（临时存储，键为手机号，TTL 内有效）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub otp: String,
    pub identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// 待确认的登录（临时存储，键为手机号，TTL 内有效）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    pub otp: String,
    pub identifier: String,
}
