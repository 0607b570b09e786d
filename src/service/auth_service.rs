//! 验证码认证协议
//!
//! 同一手机号同一时刻只有一个有效挑战，重复请求直接覆盖旧挑战。
//! 确认时通过 `EphemeralStore::take`（GETDEL）原子地取走挑战：
//! 每个挑战最多被一次确认尝试观察到，校验失败该挑战即作废，
//! 客户端需要重新请求验证码。

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{generate_identifier, generate_otp, JwtService};
use crate::config::{MAX_DEVICES_PER_USER, USER_ROLE};
use crate::error::{Result, ServerError};
use crate::infra::metrics;
use crate::model::{
    ChangePhoneConfirmRequest, ChangePhoneRequest, LoginConfirmRequest, LoginRequest, OtpIssued,
    PendingLogin, PendingRegistration, RegisterConfirmRequest, RegisterRequest, TokenPair,
};
use crate::repository::{DeviceStore, EphemeralStore, NewUser, UserStore};
use crate::sms::SmsProvider;

/// 认证服务
///
/// 只依赖存储能力接口，持久化后端可替换
pub struct AuthService {
    users: Arc<dyn UserStore>,
    devices: Arc<dyn DeviceStore>,
    ephemeral: Arc<dyn EphemeralStore>,
    jwt: Arc<JwtService>,
    sms: Arc<dyn SmsProvider>,
    otp_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        devices: Arc<dyn DeviceStore>,
        ephemeral: Arc<dyn EphemeralStore>,
        jwt: Arc<JwtService>,
        sms: Arc<dyn SmsProvider>,
        otp_ttl: Duration,
    ) -> Self {
        Self {
            users,
            devices,
            ephemeral,
            jwt,
            sms,
            otp_ttl,
        }
    }

    fn ttl_minutes(&self) -> u64 {
        (self.otp_ttl.as_secs() / 60).max(1)
    }

    // =====================================================
    // 注册
    // =====================================================

    /// 注册：下发验证码，注册资料连同验证码一起暂存
    pub async fn register_request(&self, req: &RegisterRequest) -> Result<OtpIssued> {
        let otp = generate_otp();
        let identifier = generate_identifier();

        let pending = PendingRegistration {
            otp: otp.clone(),
            identifier: identifier.clone(),
            first_name: req.user.first_name.clone(),
            last_name: req.user.last_name.clone(),
            phone_number: req.phone_number.clone(),
        };

        let payload = serde_json::to_string(&pending)
            .map_err(|e| ServerError::Internal(format!("序列化注册挑战失败: {}", e)))?;

        self.ephemeral
            .set_ex(&req.phone_number, &payload, self.otp_ttl)
            .await?;

        let message = format!("注册验证码: {}，{} 分钟内有效", otp, self.ttl_minutes());
        self.sms.send(&req.phone_number, &message).await?;

        metrics::record_otp_issued("register");
        info!("注册验证码已下发: phone={}", req.phone_number);

        Ok(OtpIssued {
            message,
            identifier: Some(identifier),
        })
    }

    /// 注册确认：校验验证码与关联标识，创建用户+首个设备并签发凭证
    ///
    /// 用户与设备在一个事务内写入（由 UserStore 保证），
    /// 不会留下没有设备的用户
    pub async fn register_confirm(&self, req: &RegisterConfirmRequest) -> Result<TokenPair> {
        let raw = match self.ephemeral.take(&req.phone_number).await? {
            Some(raw) => raw,
            None => {
                metrics::record_otp_verify("register", "expired");
                return Err(ServerError::OtpExpired);
            }
        };

        let pending: PendingRegistration = serde_json::from_str(&raw)
            .map_err(|e| ServerError::Internal(format!("解析注册挑战失败: {}", e)))?;

        if req.otp != pending.otp {
            metrics::record_otp_verify("register", "mismatch");
            warn!("注册验证码不匹配: phone={}", req.phone_number);
            return Err(ServerError::OtpMismatch);
        }

        if req.identifier != pending.identifier {
            metrics::record_otp_verify("register", "identifier_mismatch");
            warn!("注册关联标识不匹配: phone={}", req.phone_number);
            return Err(ServerError::IdentifierMismatch);
        }

        let new_user = NewUser {
            first_name: pending.first_name,
            last_name: pending.last_name,
            phone_number: pending.phone_number,
        };

        let (user, device) = self
            .users
            .create_with_device(&new_user, &req.device_info)
            .await?;

        let (access_token, refresh_token) =
            self.jwt.issue_pair(user.id, USER_ROLE, Some(device.id))?;

        metrics::record_otp_verify("register", "ok");
        metrics::record_device_registered();
        info!("✅ 注册完成: user_id={}, device_id={}", user.id, device.id);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    // =====================================================
    // 登录
    // =====================================================

    /// 登录：向已注册的手机号下发验证码
    pub async fn login_request(&self, req: &LoginRequest) -> Result<OtpIssued> {
        // 未注册的号码直接拒绝，不产生无法使用的挑战
        if self.users.find_by_phone(&req.phone_number).await?.is_none() {
            return Err(ServerError::UserNotFound(req.phone_number.clone()));
        }

        let otp = generate_otp();
        let identifier = generate_identifier();

        let pending = PendingLogin {
            otp: otp.clone(),
            identifier: identifier.clone(),
        };

        let payload = serde_json::to_string(&pending)
            .map_err(|e| ServerError::Internal(format!("序列化登录挑战失败: {}", e)))?;

        self.ephemeral
            .set_ex(&req.phone_number, &payload, self.otp_ttl)
            .await?;

        let message = format!("登录验证码: {}，{} 分钟内有效", otp, self.ttl_minutes());
        self.sms.send(&req.phone_number, &message).await?;

        metrics::record_otp_issued("login");
        info!("登录验证码已下发: phone={}", req.phone_number);

        Ok(OtpIssued {
            message,
            identifier: Some(identifier),
        })
    }

    /// 登录确认：校验验证码，检查设备数上限，登记设备并签发凭证
    pub async fn login_confirm(&self, req: &LoginConfirmRequest) -> Result<TokenPair> {
        let raw = match self.ephemeral.take(&req.phone_number).await? {
            Some(raw) => raw,
            None => {
                metrics::record_otp_verify("login", "expired");
                return Err(ServerError::OtpExpired);
            }
        };

        let pending: PendingLogin = serde_json::from_str(&raw)
            .map_err(|e| ServerError::Internal(format!("解析登录挑战失败: {}", e)))?;

        if req.otp != pending.otp {
            metrics::record_otp_verify("login", "mismatch");
            warn!("登录验证码不匹配: phone={}", req.phone_number);
            return Err(ServerError::OtpMismatch);
        }

        if req.identifier != pending.identifier {
            metrics::record_otp_verify("login", "identifier_mismatch");
            warn!("登录关联标识不匹配: phone={}", req.phone_number);
            return Err(ServerError::IdentifierMismatch);
        }

        let user = self
            .users
            .find_by_phone(&req.phone_number)
            .await?
            .ok_or_else(|| ServerError::UserNotFound(req.phone_number.clone()))?;

        // 设备数上限检查必须在插入之前；超限时把现有设备列表
        // 返回给客户端，由用户选择删除哪一台
        let device_count = self.devices.count_for_user(user.id).await?;
        if device_count >= MAX_DEVICES_PER_USER {
            let existing = self.devices.get_all(user.id).await?;
            metrics::record_device_limit_rejected();
            warn!(
                "设备数超限: user_id={}, count={}",
                user.id, device_count
            );
            return Err(ServerError::DeviceLimitExceeded(existing));
        }

        // 设备行必须先存在，它的 id 才能进入凭证
        let device = self.devices.insert(user.id, &req.device_info).await?;

        let (access_token, refresh_token) =
            self.jwt.issue_pair(user.id, USER_ROLE, Some(device.id))?;

        metrics::record_otp_verify("login", "ok");
        metrics::record_device_registered();
        info!("✅ 登录完成: user_id={}, device_id={}", user.id, device.id);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    // =====================================================
    // 换绑手机号
    // =====================================================

    /// 换绑：向新手机号下发验证码（该流程不签发关联标识）
    pub async fn change_phone_request(
        &self,
        user_id: Uuid,
        req: &ChangePhoneRequest,
    ) -> Result<OtpIssued> {
        let otp = generate_otp();

        self.ephemeral
            .set_ex(&req.phone_number, &otp, self.otp_ttl)
            .await?;

        let message = format!(
            "换绑手机号验证码: {}，{} 分钟内有效",
            otp,
            self.ttl_minutes()
        );
        self.sms.send(&req.phone_number, &message).await?;

        metrics::record_otp_issued("change_phone");
        info!(
            "换绑验证码已下发: user_id={}, new_phone={}",
            user_id, req.phone_number
        );

        Ok(OtpIssued {
            message,
            identifier: None,
        })
    }

    /// 换绑确认：校验验证码并更新手机号
    pub async fn change_phone_confirm(
        &self,
        user_id: Uuid,
        req: &ChangePhoneConfirmRequest,
    ) -> Result<()> {
        let stored = match self.ephemeral.take(&req.phone_number).await? {
            Some(stored) => stored,
            None => {
                metrics::record_otp_verify("change_phone", "expired");
                return Err(ServerError::OtpExpired);
            }
        };

        if stored != req.otp {
            metrics::record_otp_verify("change_phone", "mismatch");
            warn!("换绑验证码不匹配: user_id={}", user_id);
            return Err(ServerError::OtpMismatch);
        }

        self.users
            .update_phone_number(user_id, &req.phone_number)
            .await?;

        metrics::record_otp_verify("change_phone", "ok");
        info!("✅ 手机号已更新: user_id={}", user_id);
        Ok(())
    }

    // =====================================================
    // 登出
    // =====================================================

    /// 登出：删除当前凭证绑定的设备行
    pub async fn logout(&self, user_id: Uuid, device_id: Option<Uuid>) -> Result<()> {
        let device_id =
            device_id.ok_or_else(|| ServerError::BadRequest("device ID is required".to_string()))?;

        self.devices.delete(device_id, user_id).await?;

        info!("用户已登出: user_id={}, device_id={}", user_id, device_id);
        Ok(())
    }
}
