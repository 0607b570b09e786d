//! 存储层
//!
//! 业务逻辑只依赖这里的四个能力接口（用户/设备/联系人/临时存储），
//! 便于替换持久化后端。PostgreSQL 实现在各 *_repo.rs 中，
//! 临时存储的 Redis / 进程内实现见 `crate::infra`。

pub mod contact_repo;
pub mod device_repo;
pub mod user_repo;

pub use contact_repo::ContactRepository;
pub use device_repo::DeviceRepository;
pub use user_repo::UserRepository;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{
    Contact, CreateContact, CreateDevice, Device, GetAllContactsRequest, GetAllContactsResponse,
    GetAllUsersRequest, GetAllUsersResponse, UpdateContact, UpdateUser, User,
};

/// 新用户资料（注册确认时写入）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// 用户存储
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 创建用户并同时登记首个设备
    ///
    /// 两次写入必须是一个原子操作：任何一步失败都不能留下
    /// 没有设备的用户行。手机号唯一性由存储保证。
    async fn create_with_device(
        &self,
        user: &NewUser,
        device: &CreateDevice,
    ) -> Result<(User, Device)>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>>;

    /// 分页列表，支持名称/手机号模糊搜索，返回总数
    async fn get_all(&self, req: &GetAllUsersRequest) -> Result<GetAllUsersResponse>;

    async fn update(&self, id: Uuid, update: &UpdateUser) -> Result<User>;

    async fn update_phone_number(&self, id: Uuid, phone: &str) -> Result<()>;

    /// 级联删除：设备、联系人、用户行在一个事务内删除
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// 设备存储
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn insert(&self, user_id: Uuid, device: &CreateDevice) -> Result<Device>;

    async fn get_all(&self, user_id: Uuid) -> Result<Vec<Device>>;

    /// 按 id + 所属用户查询；所属不匹配等同于不存在
    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Device>>;

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64>;

    /// 删除用户自己的设备
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;

    /// 无条件删除（未认证的清理通道）
    async fn remove(&self, id: Uuid) -> Result<()>;
}

/// 联系人存储（所有操作按所属用户隔离）
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create(&self, user_id: Uuid, contact: &CreateContact) -> Result<Contact>;

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Contact>>;

    async fn get_all(
        &self,
        user_id: Uuid,
        req: &GetAllContactsRequest,
    ) -> Result<GetAllContactsResponse>;

    async fn update(&self, id: Uuid, user_id: Uuid, update: &UpdateContact) -> Result<Contact>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;
}

/// 临时键值存储（带 TTL 的验证码/挑战载荷）
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// 写入并设置过期时间；同 key 重复写入直接覆盖
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 原子地读取并删除（Redis GETDEL）
    ///
    /// 同一个挑战最多只有一次确认尝试能取到值
    async fn take(&self, key: &str) -> Result<Option<String>>;

    async fn del(&self, key: &str) -> Result<()>;
}

/// 分页参数归一化（page 从 1 开始，limit 缺省 10）
pub fn normalize_page(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = match page {
        Some(0) | None => 1,
        Some(p) => p,
    };
    let limit = match limit {
        Some(0) | None => 10,
        Some(l) => l,
    };
    (page, limit)
}
