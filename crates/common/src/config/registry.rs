//! 注册中心相关配置
//!
//! 既被注册中心服务端使用（心跳、fan-out），也被客户端使用（注册中心地址、超时）。

use serde::{Deserialize, Serialize};

/// 注册中心配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// 注册中心 `/services` 端点的完整 URL
    ///
    /// 客户端向它 POST 注册项、DELETE 注销。
    /// 默认: "http://localhost:3000/services"
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// 出站 HTTP 请求超时（秒）
    ///
    /// 覆盖 patch 推送、心跳探测与注册请求。默认 5。
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// patch 推送的最大并发数
    ///
    /// 不设置时不限制并发（每个接收方一个独立任务）。
    #[serde(default)]
    pub notify_concurrency: Option<usize>,

    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
}

/// 心跳检测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// 两轮检测之间的间隔（秒）
    #[serde(default = "default_heartbeat_interval")]
    pub interval_secs: u64,

    /// 每轮对单个实例的最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 两次尝试之间的退避时间（秒）
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
}

fn default_registry_url() -> String {
    "http://localhost:3000/services".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_heartbeat_interval() -> u64 {
    3
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    1
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            request_timeout_secs: default_request_timeout(),
            notify_concurrency: None,
            heartbeat: HeartbeatConfig::default(),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_heartbeat_interval(),
            max_attempts: default_max_attempts(),
            retry_backoff_secs: default_retry_backoff(),
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(format!(
                "registry.url must start with http:// or https://, got '{}'",
                self.url
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("registry.request_timeout_secs must be greater than 0".to_string());
        }
        if self.notify_concurrency == Some(0) {
            return Err("registry.notify_concurrency must be greater than 0 when set".to_string());
        }
        if self.heartbeat.max_attempts == 0 {
            return Err("registry.heartbeat.max_attempts must be greater than 0".to_string());
        }
        if self.heartbeat.interval_secs == 0 {
            return Err("registry.heartbeat.interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
