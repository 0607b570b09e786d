//! 验证码认证协议的端到端测试
//!
//! 用进程内存储实现四个能力接口，完整走一遍
//! 注册/登录/换绑/登出流程，不依赖外部 Postgres/Redis。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use privauth_server::auth::JwtService;
use privauth_server::error::{Result, ServerError};
use privauth_server::infra::MemoryStore;
use privauth_server::model::{
    ChangePhoneConfirmRequest, ChangePhoneRequest, Contact, CreateContact, CreateDevice,
    CreateUser, Device, GetAllContactsRequest, GetAllContactsResponse, GetAllUsersRequest,
    GetAllUsersResponse, LoginConfirmRequest, LoginRequest, PendingLogin, PendingRegistration,
    RegisterConfirmRequest, RegisterRequest, UpdateContact, UpdateUser, User,
};
use privauth_server::repository::{
    ContactStore, DeviceStore, EphemeralStore, NewUser, UserStore,
};
use privauth_server::service::AuthService;
use privauth_server::sms::LogSmsProvider;

// =====================================================
// 进程内存储实现（仅测试用）
// =====================================================

#[derive(Default)]
struct MemDb {
    users: Mutex<HashMap<Uuid, User>>,
    devices: Mutex<HashMap<Uuid, Device>>,
    contacts: Mutex<HashMap<Uuid, Contact>>,
}

struct MemUserStore(Arc<MemDb>);
struct MemDeviceStore(Arc<MemDb>);
struct MemContactStore(Arc<MemDb>);

fn make_device(user_id: Uuid, device: &CreateDevice) -> Device {
    Device {
        id: Uuid::new_v4(),
        user_id,
        name: device.name.clone(),
        notification_key: device.notification_key.clone(),
        device_type: device.device_type,
        os_version: device.os_version.clone(),
        app_version: device.app_version.clone(),
        remember_me: device.remember_me,
        ad_id: device.ad_id.clone(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn create_with_device(
        &self,
        user: &NewUser,
        device: &CreateDevice,
    ) -> Result<(User, Device)> {
        let mut users = self.0.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.phone_number == user.phone_number)
        {
            return Err(ServerError::DuplicateEntry(
                "phone number already registered".to_string(),
            ));
        }

        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        users.insert(created.id, created.clone());

        let created_device = make_device(created.id, device);
        self.0
            .devices
            .lock()
            .unwrap()
            .insert(created_device.id, created_device.clone());

        Ok((created, created_device))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.0.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.phone_number == phone)
            .cloned())
    }

    async fn get_all(&self, req: &GetAllUsersRequest) -> Result<GetAllUsersResponse> {
        let page = req.page.unwrap_or(1).max(1);
        let limit = req.limit.unwrap_or(10).max(1);

        let users = self.0.users.lock().unwrap();
        let mut matched: Vec<User> = users
            .values()
            .filter(|u| match &req.search {
                Some(s) if !s.is_empty() => {
                    let s = s.to_lowercase();
                    u.first_name.to_lowercase().contains(&s)
                        || u.last_name.to_lowercase().contains(&s)
                        || u.phone_number.contains(&s)
                }
                _ => true,
            })
            .cloned()
            .collect();
        matched.sort_by_key(|u| u.phone_number.clone());

        let count = matched.len() as i64;
        let users = matched
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();

        Ok(GetAllUsersResponse { users, count })
    }

    async fn update(&self, id: Uuid, update: &UpdateUser) -> Result<User> {
        let mut users = self.0.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| ServerError::UserNotFound(id.to_string()))?;
        user.first_name = update.first_name.clone();
        user.last_name = update.last_name.clone();
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn update_phone_number(&self, id: Uuid, phone: &str) -> Result<()> {
        let mut users = self.0.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| ServerError::UserNotFound(id.to_string()))?;
        user.phone_number = phone.to_string();
        user.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut users = self.0.users.lock().unwrap();
        if users.remove(&id).is_none() {
            return Err(ServerError::UserNotFound(id.to_string()));
        }
        self.0
            .devices
            .lock()
            .unwrap()
            .retain(|_, d| d.user_id != id);
        self.0
            .contacts
            .lock()
            .unwrap()
            .retain(|_, c| c.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl DeviceStore for MemDeviceStore {
    async fn insert(&self, user_id: Uuid, device: &CreateDevice) -> Result<Device> {
        let created = make_device(user_id, device);
        self.0
            .devices
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_all(&self, user_id: Uuid) -> Result<Vec<Device>> {
        Ok(self
            .0
            .devices
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Device>> {
        Ok(self
            .0
            .devices
            .lock()
            .unwrap()
            .get(&id)
            .filter(|d| d.user_id == user_id)
            .cloned())
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        Ok(self
            .0
            .devices
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.user_id == user_id)
            .count() as i64)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let mut devices = self.0.devices.lock().unwrap();
        match devices.get(&id) {
            Some(d) if d.user_id == user_id => {
                devices.remove(&id);
                Ok(())
            }
            _ => Err(ServerError::NotFound("device not found".to_string())),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<()> {
        if self.0.devices.lock().unwrap().remove(&id).is_none() {
            return Err(ServerError::NotFound("device not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MemContactStore {
    async fn create(&self, user_id: Uuid, contact: &CreateContact) -> Result<Contact> {
        let created = Contact {
            id: Uuid::new_v4(),
            user_id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            middle_name: contact.middle_name.clone(),
            phone_number: contact.phone_number.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        self.0
            .contacts
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Contact>> {
        // 所属不匹配等同于不存在
        Ok(self
            .0
            .contacts
            .lock()
            .unwrap()
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn get_all(
        &self,
        user_id: Uuid,
        req: &GetAllContactsRequest,
    ) -> Result<GetAllContactsResponse> {
        let page = req.page.unwrap_or(1).max(1);
        let limit = req.limit.unwrap_or(10).max(1);

        let contacts = self.0.contacts.lock().unwrap();
        let mut matched: Vec<Contact> = contacts
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| match &req.search {
                Some(s) if !s.is_empty() => {
                    let s = s.to_lowercase();
                    c.first_name.to_lowercase().contains(&s) || c.phone_number.contains(&s)
                }
                _ => true,
            })
            .cloned()
            .collect();
        matched.sort_by_key(|c| c.phone_number.clone());

        let count = matched.len() as i64;
        let contacts = matched
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();

        Ok(GetAllContactsResponse { contacts, count })
    }

    async fn update(&self, id: Uuid, user_id: Uuid, update: &UpdateContact) -> Result<Contact> {
        let mut contacts = self.0.contacts.lock().unwrap();
        let contact = contacts
            .get_mut(&id)
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| ServerError::NotFound("contact not found".to_string()))?;

        if let Some(v) = &update.first_name {
            contact.first_name = v.clone();
        }
        if let Some(v) = &update.last_name {
            contact.last_name = v.clone();
        }
        if let Some(v) = &update.middle_name {
            contact.middle_name = v.clone();
        }
        if let Some(v) = &update.phone_number {
            contact.phone_number = v.clone();
        }
        contact.updated_at = Some(Utc::now());
        Ok(contact.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let mut contacts = self.0.contacts.lock().unwrap();
        match contacts.get(&id) {
            Some(c) if c.user_id == user_id => {
                contacts.remove(&id);
                Ok(())
            }
            _ => Err(ServerError::NotFound("contact not found".to_string())),
        }
    }
}

// =====================================================
// 测试装配
// =====================================================

struct TestHarness {
    db: Arc<MemDb>,
    ephemeral: Arc<MemoryStore>,
    jwt: Arc<JwtService>,
    service: AuthService,
}

fn harness() -> TestHarness {
    let db = Arc::new(MemDb::default());
    let ephemeral = Arc::new(MemoryStore::new());
    let jwt = Arc::new(JwtService::new(
        "test-secret-key-at-least-32-chars",
        "privauth".to_string(),
    ));

    let service = AuthService::new(
        Arc::new(MemUserStore(db.clone())),
        Arc::new(MemDeviceStore(db.clone())),
        ephemeral.clone(),
        jwt.clone(),
        Arc::new(LogSmsProvider),
        Duration::from_secs(120),
    );

    TestHarness {
        db,
        ephemeral,
        jwt,
        service,
    }
}

const PHONE: &str = "+15550000";

fn register_request(phone: &str) -> RegisterRequest {
    RegisterRequest {
        phone_number: phone.to_string(),
        user: CreateUser {
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
        },
    }
}

fn pixel_device() -> CreateDevice {
    CreateDevice {
        name: "pixel".to_string(),
        ..CreateDevice::default()
    }
}

/// 从临时存储里读出当前挑战（测试窥探用，不消费）
async fn peek_registration(h: &TestHarness, phone: &str) -> PendingRegistration {
    let raw = h.ephemeral.get(phone).await.unwrap().expect("挑战应存在");
    serde_json::from_str(&raw).unwrap()
}

async fn peek_login(h: &TestHarness, phone: &str) -> PendingLogin {
    let raw = h.ephemeral.get(phone).await.unwrap().expect("挑战应存在");
    serde_json::from_str(&raw).unwrap()
}

async fn seed_user(h: &TestHarness, phone: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        first_name: "Seed".to_string(),
        last_name: "User".to_string(),
        phone_number: phone.to_string(),
        created_at: Utc::now(),
        updated_at: None,
    };
    h.db.users.lock().unwrap().insert(user.id, user.clone());
    user
}

fn user_count(h: &TestHarness) -> usize {
    h.db.users.lock().unwrap().len()
}

fn device_count(h: &TestHarness) -> usize {
    h.db.devices.lock().unwrap().len()
}

// =====================================================
// 注册流程
// =====================================================

#[tokio::test]
async fn register_confirm_creates_one_user_and_one_device() {
    let h = harness();

    let issued = h.service.register_request(&register_request(PHONE)).await.unwrap();
    assert!(issued.message.contains("验证码"));
    let identifier = issued.identifier.clone().expect("注册应签发关联标识");

    let pending = peek_registration(&h, PHONE).await;
    assert_eq!(pending.identifier, identifier);
    assert_eq!(pending.phone_number, PHONE);
    // 下发的 message 里应包含验证码本身
    assert!(issued.message.contains(&pending.otp));

    let tokens = h
        .service
        .register_confirm(&RegisterConfirmRequest {
            phone_number: PHONE.to_string(),
            otp: pending.otp.clone(),
            identifier,
            device_info: pixel_device(),
        })
        .await
        .unwrap();

    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
    assert_eq!(user_count(&h), 1);
    assert_eq!(device_count(&h), 1);

    // 凭证声明应绑定刚创建的用户与设备
    let claims = h.jwt.verify_token(&tokens.access_token).unwrap();
    let user = h
        .db
        .users
        .lock()
        .unwrap()
        .values()
        .next()
        .cloned()
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.role, "user");
    assert!(claims.device_uuid().is_some());
}

#[tokio::test]
async fn register_confirm_is_single_use() {
    let h = harness();

    h.service.register_request(&register_request(PHONE)).await.unwrap();
    let pending = peek_registration(&h, PHONE).await;

    let req = RegisterConfirmRequest {
        phone_number: PHONE.to_string(),
        otp: pending.otp.clone(),
        identifier: pending.identifier.clone(),
        device_info: pixel_device(),
    };

    h.service.register_confirm(&req).await.unwrap();

    // 同一挑战第二次确认必须失败：已被消费
    let second = h.service.register_confirm(&req).await;
    assert!(matches!(second, Err(ServerError::OtpExpired)));
    assert_eq!(user_count(&h), 1);
    assert_eq!(device_count(&h), 1);
}

#[tokio::test]
async fn register_confirm_rejects_wrong_otp() {
    let h = harness();

    h.service.register_request(&register_request(PHONE)).await.unwrap();
    let pending = peek_registration(&h, PHONE).await;

    let wrong_otp = if pending.otp == "000000" { "111111" } else { "000000" };
    let result = h
        .service
        .register_confirm(&RegisterConfirmRequest {
            phone_number: PHONE.to_string(),
            otp: wrong_otp.to_string(),
            identifier: pending.identifier,
            device_info: pixel_device(),
        })
        .await;

    assert!(matches!(result, Err(ServerError::OtpMismatch)));
    assert_eq!(user_count(&h), 0);
    assert_eq!(device_count(&h), 0);
}

#[tokio::test]
async fn register_confirm_rejects_wrong_identifier() {
    let h = harness();

    h.service.register_request(&register_request(PHONE)).await.unwrap();
    let pending = peek_registration(&h, PHONE).await;

    // 验证码正确但关联标识不对，同样不能产生任何持久化变更
    let result = h
        .service
        .register_confirm(&RegisterConfirmRequest {
            phone_number: PHONE.to_string(),
            otp: pending.otp,
            identifier: "not-the-identifier".to_string(),
            device_info: pixel_device(),
        })
        .await;

    assert!(matches!(result, Err(ServerError::IdentifierMismatch)));
    assert_eq!(user_count(&h), 0);
    assert_eq!(device_count(&h), 0);
}

#[tokio::test]
async fn reissue_overwrites_previous_challenge() {
    let h = harness();

    let first = h.service.register_request(&register_request(PHONE)).await.unwrap();
    let second = h.service.register_request(&register_request(PHONE)).await.unwrap();
    assert_ne!(first.identifier, second.identifier);

    // 临时存储里只剩第二个挑战（last-write-wins）
    let pending = peek_registration(&h, PHONE).await;
    assert_eq!(pending.identifier, second.identifier.unwrap());
}

// =====================================================
// 登录流程与设备上限
// =====================================================

#[tokio::test]
async fn login_request_rejects_unknown_phone() {
    let h = harness();

    let result = h
        .service
        .login_request(&LoginRequest {
            phone_number: "+19998887766".to_string(),
        })
        .await;

    assert!(matches!(result, Err(ServerError::UserNotFound(_))));
}

async fn login(h: &TestHarness, phone: &str, device_name: &str) -> Result<()> {
    h.service
        .login_request(&LoginRequest {
            phone_number: phone.to_string(),
        })
        .await?;
    let pending = peek_login(h, phone).await;

    h.service
        .login_confirm(&LoginConfirmRequest {
            phone_number: phone.to_string(),
            otp: pending.otp,
            identifier: pending.identifier,
            device_info: CreateDevice {
                name: device_name.to_string(),
                ..CreateDevice::default()
            },
        })
        .await
        .map(|_| ())
}

#[tokio::test]
async fn login_confirm_registers_device_and_issues_tokens() {
    let h = harness();
    let user = seed_user(&h, PHONE).await;

    h.service
        .login_request(&LoginRequest {
            phone_number: PHONE.to_string(),
        })
        .await
        .unwrap();
    let pending = peek_login(&h, PHONE).await;

    let tokens = h
        .service
        .login_confirm(&LoginConfirmRequest {
            phone_number: PHONE.to_string(),
            otp: pending.otp,
            identifier: pending.identifier,
            device_info: pixel_device(),
        })
        .await
        .unwrap();

    assert!(!tokens.access_token.is_empty());
    assert_eq!(device_count(&h), 1);

    let claims = h.jwt.verify_token(&tokens.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert!(claims.device_uuid().is_some());
}

#[tokio::test]
async fn fourth_device_is_rejected_with_device_list() {
    let h = harness();
    seed_user(&h, PHONE).await;

    for name in ["one", "two", "three"] {
        login(&h, PHONE, name).await.unwrap();
    }
    assert_eq!(device_count(&h), 3);

    // 第 4 台设备：确认必须失败，不登记设备、不签发凭证，
    // 并把现有 3 台设备返回给客户端
    h.service
        .login_request(&LoginRequest {
            phone_number: PHONE.to_string(),
        })
        .await
        .unwrap();
    let pending = peek_login(&h, PHONE).await;

    let result = h
        .service
        .login_confirm(&LoginConfirmRequest {
            phone_number: PHONE.to_string(),
            otp: pending.otp,
            identifier: pending.identifier,
            device_info: CreateDevice {
                name: "four".to_string(),
                ..CreateDevice::default()
            },
        })
        .await;

    match result {
        Err(ServerError::DeviceLimitExceeded(devices)) => {
            assert_eq!(devices.len(), 3);
        }
        other => panic!("expected DeviceLimitExceeded, got {:?}", other.map(|_| ())),
    }
    assert_eq!(device_count(&h), 3);
}

#[tokio::test]
async fn third_device_still_fits_under_the_cap() {
    let h = harness();
    seed_user(&h, PHONE).await;

    login(&h, PHONE, "one").await.unwrap();
    login(&h, PHONE, "two").await.unwrap();
    assert_eq!(device_count(&h), 2);

    login(&h, PHONE, "three").await.unwrap();
    assert_eq!(device_count(&h), 3);
}

// =====================================================
// 登出与换绑
// =====================================================

#[tokio::test]
async fn logout_deletes_the_bound_device() {
    let h = harness();
    let user = seed_user(&h, PHONE).await;

    login(&h, PHONE, "pixel").await.unwrap();
    let device_id = h
        .db
        .devices
        .lock()
        .unwrap()
        .keys()
        .next()
        .copied()
        .unwrap();

    h.service.logout(user.id, Some(device_id)).await.unwrap();
    assert_eq!(device_count(&h), 0);

    // 凭证里没有设备绑定时登出是一个坏请求
    let result = h.service.logout(user.id, None).await;
    assert!(matches!(result, Err(ServerError::BadRequest(_))));
}

#[tokio::test]
async fn change_phone_confirm_updates_the_number() {
    let h = harness();
    let user = seed_user(&h, PHONE).await;
    let new_phone = "+15551111";

    let issued = h
        .service
        .change_phone_request(
            user.id,
            &ChangePhoneRequest {
                phone_number: new_phone.to_string(),
            },
        )
        .await
        .unwrap();
    // 换绑流程不签发关联标识
    assert!(issued.identifier.is_none());

    let otp = h.ephemeral.get(new_phone).await.unwrap().unwrap();

    h.service
        .change_phone_confirm(
            user.id,
            &ChangePhoneConfirmRequest {
                phone_number: new_phone.to_string(),
                otp,
            },
        )
        .await
        .unwrap();

    let updated = h.db.users.lock().unwrap().get(&user.id).cloned().unwrap();
    assert_eq!(updated.phone_number, new_phone);

    // 挑战已消费，重复确认失败
    let replay = h
        .service
        .change_phone_confirm(
            user.id,
            &ChangePhoneConfirmRequest {
                phone_number: new_phone.to_string(),
                otp: "123456".to_string(),
            },
        )
        .await;
    assert!(matches!(replay, Err(ServerError::OtpExpired)));
}

#[tokio::test]
async fn change_phone_confirm_rejects_wrong_otp() {
    let h = harness();
    let user = seed_user(&h, PHONE).await;
    let new_phone = "+15551111";

    h.service
        .change_phone_request(
            user.id,
            &ChangePhoneRequest {
                phone_number: new_phone.to_string(),
            },
        )
        .await
        .unwrap();

    let stored = h.ephemeral.get(new_phone).await.unwrap().unwrap();
    let wrong = if stored == "000000" { "111111" } else { "000000" };

    let result = h
        .service
        .change_phone_confirm(
            user.id,
            &ChangePhoneConfirmRequest {
                phone_number: new_phone.to_string(),
                otp: wrong.to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(ServerError::OtpMismatch)));

    // 手机号保持不变
    let unchanged = h.db.users.lock().unwrap().get(&user.id).cloned().unwrap();
    assert_eq!(unchanged.phone_number, PHONE);
}

// =====================================================
// 存储隔离与分页（通过能力接口验证约定）
// =====================================================

#[tokio::test]
async fn contact_lookup_with_foreign_owner_behaves_as_not_found() {
    let h = harness();
    let owner = seed_user(&h, PHONE).await;
    let stranger = seed_user(&h, "+15559999").await;

    let contacts = MemContactStore(h.db.clone());
    let contact = contacts
        .create(
            owner.id,
            &CreateContact {
                first_name: "Ota".to_string(),
                last_name: String::new(),
                middle_name: String::new(),
                phone_number: "+15553333".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(contacts
        .get_by_id(contact.id, owner.id)
        .await
        .unwrap()
        .is_some());
    // 他人的 user_id 查询结果与不存在完全一致
    assert!(contacts
        .get_by_id(contact.id, stranger.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn pagination_returns_remainder_and_total_count() {
    let h = harness();
    let owner = seed_user(&h, PHONE).await;
    let contacts = MemContactStore(h.db.clone());

    for i in 0..15 {
        contacts
            .create(
                owner.id,
                &CreateContact {
                    first_name: format!("c{:02}", i),
                    last_name: String::new(),
                    middle_name: String::new(),
                    phone_number: format!("+1555000{:04}", i),
                },
            )
            .await
            .unwrap();
    }

    let page2 = contacts
        .get_all(
            owner.id,
            &GetAllContactsRequest {
                search: None,
                page: Some(2),
                limit: Some(10),
            },
        )
        .await
        .unwrap();

    assert_eq!(page2.contacts.len(), 5);
    assert_eq!(page2.count, 15);
}

#[tokio::test]
async fn cascade_delete_removes_devices_and_contacts() {
    let h = harness();
    let user = seed_user(&h, PHONE).await;

    login(&h, PHONE, "pixel").await.unwrap();
    let contacts = MemContactStore(h.db.clone());
    contacts
        .create(
            user.id,
            &CreateContact {
                first_name: "Ona".to_string(),
                last_name: String::new(),
                middle_name: String::new(),
                phone_number: "+15554444".to_string(),
            },
        )
        .await
        .unwrap();

    let users = MemUserStore(h.db.clone());
    users.delete(user.id).await.unwrap();

    assert_eq!(user_count(&h), 0);
    assert_eq!(device_count(&h), 0);
    assert!(h.db.contacts.lock().unwrap().is_empty());
}
