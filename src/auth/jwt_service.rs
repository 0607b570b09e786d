use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use crate::error::{Result, ServerError};

/// 会话凭证声明
///
/// access / refresh token 携带相同的声明，仅过期时间不同
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 签发者
    pub iss: String,
    /// 用户ID
    pub sub: String,
    /// 用户角色
    pub role: String,
    /// 绑定的设备ID（换绑手机号等流程签发的 token 可能没有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// 过期时间
    pub exp: i64,
    /// 签发时间
    pub iat: i64,
    /// Token 唯一标识
    pub jti: String,
}

impl SessionClaims {
    /// 解析用户ID
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| ServerError::InvalidToken)
    }

    /// 解析设备ID
    pub fn device_uuid(&self) -> Option<Uuid> {
        self.device_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

/// JWT 签发和验证服务 (HS256 对称加密)
///
/// 密钥在构造时注入，进程内不读取任何全局状态
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// 创建 JWT 服务
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// 签发 access + refresh token 对
    ///
    /// access 24 小时过期，refresh 10 天过期，声明内容相同
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        role: &str,
        device_id: Option<Uuid>,
    ) -> Result<(String, String)> {
        let access = self.issue_token(user_id, role, device_id, ACCESS_TOKEN_TTL_SECS)?;
        let refresh = self.issue_token(user_id, role, device_id, REFRESH_TOKEN_TTL_SECS)?;
        Ok((access, refresh))
    }

    /// 签发单个 token
    fn issue_token(
        &self,
        user_id: Uuid,
        role: &str,
        device_id: Option<Uuid>,
        ttl_secs: i64,
    ) -> Result<String> {
        let now = Utc::now().timestamp();

        let claims = SessionClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            role: role.to_string(),
            device_id: device_id.map(|id| id.to_string()),
            exp: now + ttl_secs,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ServerError::Internal(format!("JWT 签发失败: {}", e)))
    }

    /// 验证 token（签名 + 过期时间 + 签发者）
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|_e| ServerError::InvalidToken)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("test-secret-key-at-least-32-chars", "privauth".to_string())
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let service = test_service();
        let user_id = Uuid::new_v4();
        let device_id = Uuid::new_v4();

        let (access, refresh) = service
            .issue_pair(user_id, "user", Some(device_id))
            .unwrap();

        assert!(!access.is_empty());
        assert!(!refresh.is_empty());
        assert_ne!(access, refresh);

        let claims = service.verify_token(&access).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, "user");
        assert_eq!(claims.device_uuid(), Some(device_id));
        assert_eq!(claims.iss, "privauth");
    }

    #[test]
    fn test_pair_without_device() {
        let service = test_service();
        let (access, _) = service.issue_pair(Uuid::new_v4(), "user", None).unwrap();

        let claims = service.verify_token(&access).unwrap();
        assert!(claims.device_id.is_none());
        assert!(claims.device_uuid().is_none());
    }

    #[test]
    fn test_verify_invalid_token() {
        let service = test_service();
        let result = service.verify_token("invalid.token.here");
        assert!(matches!(result, Err(ServerError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = JwtService::new("secret-1", "privauth".to_string());
        let service2 = JwtService::new("secret-2", "privauth".to_string());

        let (access, _) = service1.issue_pair(Uuid::new_v4(), "user", None).unwrap();
        assert!(service2.verify_token(&access).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issuer_a = JwtService::new("same-secret", "privauth".to_string());
        let issuer_b = JwtService::new("same-secret", "someone-else".to_string());

        let (access, _) = issuer_a.issue_pair(Uuid::new_v4(), "user", None).unwrap();
        assert!(issuer_b.verify_token(&access).is_err());
    }

    #[test]
    fn test_token_ttls() {
        let service = test_service();
        let (access, refresh) = service.issue_pair(Uuid::new_v4(), "user", None).unwrap();

        let now = Utc::now().timestamp();
        let access_claims = service.verify_token(&access).unwrap();
        let refresh_claims = service.verify_token(&refresh).unwrap();

        let access_ttl = access_claims.exp - now;
        assert!(access_ttl > 23 * 3600 && access_ttl <= 24 * 3600);

        let refresh_ttl = refresh_claims.exp - now;
        assert!(refresh_ttl > 9 * 24 * 3600 && refresh_ttl <= 10 * 24 * 3600);
    }
}
