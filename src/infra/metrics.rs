//! Prometheus 指标：验证码签发/校验、设备登记、连接池状态
//!
//! 通过 `init()` 安装全局 Recorder，通过 HTTP GET `/metrics` 暴露抓取端点。

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 指标名称
const COUNTER_OTP_ISSUED: &str = "privauth_otp_issued_total";
const COUNTER_OTP_VERIFY: &str = "privauth_otp_verify_total";
const COUNTER_DEVICES_REGISTERED: &str = "privauth_devices_registered_total";
const COUNTER_DEVICE_LIMIT_REJECTED: &str = "privauth_device_limit_rejected_total";
const GAUGE_DB_POOL_ACTIVE: &str = "privauth_db_pool_active";
const GAUGE_DB_POOL_IDLE: &str = "privauth_db_pool_idle";
const GAUGE_REDIS_POOL_ACTIVE: &str = "privauth_redis_pool_active";
const GAUGE_REDIS_POOL_IDLE: &str = "privauth_redis_pool_idle";

/// 初始化 Prometheus 指标（安装全局 Recorder，返回 Handle 用于 HTTP 暴露）。
/// 仅需在进程内调用一次；重复调用会返回 Err。
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    HANDLE
        .set(handle)
        .map_err(|_| "metrics already initialized")?;
    Ok(())
}

/// 渲染当前指标为 Prometheus 文本格式，供 GET /metrics 使用。
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// 记录一次验证码签发（flow: register / login / change_phone）
pub fn record_otp_issued(flow: &'static str) {
    metrics::counter!(COUNTER_OTP_ISSUED, "flow" => flow).increment(1);
}

/// 记录一次验证码校验结果（result: ok / expired / mismatch / identifier_mismatch）
pub fn record_otp_verify(flow: &'static str, result: &'static str) {
    metrics::counter!(COUNTER_OTP_VERIFY, "flow" => flow, "result" => result).increment(1);
}

/// 记录一次设备登记
pub fn record_device_registered() {
    metrics::counter!(COUNTER_DEVICES_REGISTERED).increment(1);
}

/// 记录一次因设备数超限被拒绝的登录
pub fn record_device_limit_rejected() {
    metrics::counter!(COUNTER_DEVICE_LIMIT_REJECTED).increment(1);
}

/// 更新数据库连接池状态（Gauge）
pub fn record_db_pool_state(active: u64, idle: u64) {
    metrics::gauge!(GAUGE_DB_POOL_ACTIVE).set(active as f64);
    metrics::gauge!(GAUGE_DB_POOL_IDLE).set(idle as f64);
}

/// 更新 Redis 连接池状态（Gauge）
pub fn record_redis_pool_state(active: u64, idle: u64) {
    metrics::gauge!(GAUGE_REDIS_POOL_ACTIVE).set(active as f64);
    metrics::gauge!(GAUGE_REDIS_POOL_IDLE).set(idle as f64);
}
