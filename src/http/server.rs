//! HTTP 服务器 - 装配存储、服务与路由

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::JwtService;
use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::http::routes;
use crate::infra::{metrics, Database, MemoryStore, RedisClient};
use crate::repository::{
    ContactRepository, ContactStore, DeviceRepository, DeviceStore, EphemeralStore,
    UserRepository, UserStore,
};
use crate::service::AuthService;
use crate::sms;

/// HTTP 服务器共享状态
#[derive(Clone)]
pub struct HttpServerState {
    pub auth_service: Arc<AuthService>,
    pub user_store: Arc<dyn UserStore>,
    pub contact_store: Arc<dyn ContactStore>,
    pub device_store: Arc<dyn DeviceStore>,
    pub jwt_service: Arc<JwtService>,
}

/// 认证/通讯录 HTTP 服务器
pub struct AuthHttpServer {
    config: ServerConfig,
    state: HttpServerState,
    db_pool: Arc<PgPool>,
    redis: Option<Arc<RedisClient>>,
}

impl AuthHttpServer {
    /// 创建服务器：连接数据库与 Redis，装配仓库和服务
    pub async fn new(config: ServerConfig) -> Result<Self> {
        if config.enable_metrics {
            if let Err(e) = metrics::init() {
                warn!("⚠️ 指标初始化失败: {}", e);
            }
        }

        let database = Database::new(&config.database_url)
            .await
            .map_err(|e| ServerError::Database(format!("数据库连接失败: {}", e)))?;
        let db_pool = Arc::new(database.pool().clone());

        // 验证码临时存储：优先 Redis，未配置时退化为进程内缓存
        let mut redis_client = None;
        let ephemeral: Arc<dyn EphemeralStore> = match &config.redis {
            Some(redis_config) => {
                let client = Arc::new(RedisClient::new(redis_config).await?);
                redis_client = Some(client.clone());
                client
            }
            None => {
                warn!("⚠️ 未配置 Redis，验证码使用进程内缓存（仅适合单机部署）");
                Arc::new(MemoryStore::new())
            }
        };

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
        ));

        let user_store: Arc<dyn UserStore> = Arc::new(UserRepository::new(db_pool.clone()));
        let device_store: Arc<dyn DeviceStore> = Arc::new(DeviceRepository::new(db_pool.clone()));
        let contact_store: Arc<dyn ContactStore> =
            Arc::new(ContactRepository::new(db_pool.clone()));

        let sms_provider = sms::provider_from_config(&config.sms);

        let auth_service = Arc::new(AuthService::new(
            user_store.clone(),
            device_store.clone(),
            ephemeral,
            jwt_service.clone(),
            sms_provider,
            config.otp_ttl(),
        ));

        let state = HttpServerState {
            auth_service,
            user_store,
            contact_store,
            device_store,
            jwt_service,
        };

        Ok(Self {
            config,
            state,
            db_pool,
            redis: redis_client,
        })
    }

    /// 启动 HTTP 服务器
    pub async fn run(&self) -> Result<()> {
        if self.config.enable_metrics {
            self.spawn_pool_gauge_task();
        }

        let app = routes::create_routes(self.state.clone());

        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Internal(format!("监听 {} 失败: {}", addr, e)))?;

        info!("🌐 HTTP 服务器启动在 {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(format!("HTTP 服务器运行失败: {}", e)))?;

        Ok(())
    }

    /// 周期性上报连接池状态指标
    fn spawn_pool_gauge_task(&self) {
        let db_pool = self.db_pool.clone();
        let redis = self.redis.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;

                let size = db_pool.size() as u64;
                let idle = db_pool.num_idle() as u64;
                metrics::record_db_pool_state(size.saturating_sub(idle), idle);

                if let Some(client) = &redis {
                    let state = client.pool_state();
                    let connections = state.connections as u64;
                    let idle = state.idle_connections as u64;
                    metrics::record_redis_pool_state(connections.saturating_sub(idle), idle);
                }
            }
        });
    }
}
