//! 短信下发
//!
//! Provider 抽象 + 两个实现：
//! - `HttpSmsProvider`：POST 到配置的短信网关
//! - `LogSmsProvider`：只写日志（开发/测试环境，验证码同时会出现在接口响应里）

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::config::SmsConfig;
use crate::error::{Result, ServerError};

/// 短信发送抽象
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// 发送一条短信
    async fn send(&self, phone_number: &str, message: &str) -> Result<()>;
}

/// HTTP 网关实现
pub struct HttpSmsProvider {
    client: reqwest::Client,
    gateway_url: String,
    token: Option<String>,
}

impl HttpSmsProvider {
    pub fn new(gateway_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            token,
        }
    }
}

#[async_trait]
impl SmsProvider for HttpSmsProvider {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()> {
        let mut request = self.client.post(&self.gateway_url).json(&json!({
            "phone_number": phone_number,
            "message": message,
        }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServerError::Internal(format!("短信网关请求失败: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("❌ 短信网关返回错误: status={}, phone={}", status, phone_number);
            return Err(ServerError::Internal(format!(
                "短信网关返回错误: {}",
                status
            )));
        }

        info!("✅ 短信已发送: phone={}", phone_number);
        Ok(())
    }
}

/// 日志实现（不真正外发）
pub struct LogSmsProvider;

#[async_trait]
impl SmsProvider for LogSmsProvider {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()> {
        info!("📨 [dev] SMS -> {}: {}", phone_number, message);
        Ok(())
    }
}

/// 根据配置选择 Provider
pub fn provider_from_config(config: &SmsConfig) -> std::sync::Arc<dyn SmsProvider> {
    match (&config.enabled, &config.gateway_url) {
        (true, Some(url)) => {
            std::sync::Arc::new(HttpSmsProvider::new(url.clone(), config.token.clone()))
        }
        _ => std::sync::Arc::new(LogSmsProvider),
    }
}
