//! 设备模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// iOS设备 (iPhone/iPad)
    Ios,
    /// Android设备 (手机/平板)
    Android,
    /// Web浏览器
    Web,
    /// macOS桌面应用
    Macos,
    /// Windows桌面应用
    Windows,
    /// Linux桌面应用
    Linux,
    /// 未知设备
    #[default]
    Unknown,
}

impl DeviceType {
    /// 从字符串转换
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ios" => DeviceType::Ios,
            "android" => DeviceType::Android,
            "web" => DeviceType::Web,
            "macos" | "desktop" => DeviceType::Macos,
            "windows" => DeviceType::Windows,
            "linux" | "unix" => DeviceType::Linux,
            _ => DeviceType::Unknown,
        }
    }

    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Ios => "ios",
            DeviceType::Android => "android",
            DeviceType::Web => "web",
            DeviceType::Macos => "macos",
            DeviceType::Windows => "windows",
            DeviceType::Linux => "linux",
            DeviceType::Unknown => "unknown",
        }
    }
}

/// 设备（对应 devices 表，每次确认登录/注册产生一行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// 设备ID
    pub id: Uuid,
    /// 所属用户ID
    pub user_id: Uuid,
    /// 设备名称
    pub name: String,
    /// 推送通知密钥
    #[serde(rename = "notificationKey")]
    pub notification_key: String,
    /// 设备类型
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// 操作系统版本
    #[serde(rename = "osVersion")]
    pub os_version: String,
    /// 应用版本
    #[serde(rename = "appVersion")]
    pub app_version: String,
    /// 记住登录
    pub remember_me: bool,
    /// 广告标识
    #[serde(rename = "adId")]
    pub ad_id: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 创建设备（登录/注册确认时客户端上报）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDevice {
    pub name: String,
    #[serde(rename = "notificationKey", default)]
    pub notification_key: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(rename = "osVersion", default)]
    pub os_version: String,
    #[serde(rename = "appVersion", default)]
    pub app_version: String,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(rename = "adId", default)]
    pub ad_id: String,
}
