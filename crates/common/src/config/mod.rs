//! 统一配置管理系统
//!
//! 注册中心、日志服务以及普通业务服务共用同一份 TOML 配置。
//! 每个段落一个子模块，默认值与校验跟着段落走。

pub mod bind;
pub mod client;
pub mod log_service;
pub mod observability;
pub mod registry;

pub use crate::config::bind::{BindConfig, HttpBindConfig};
pub use crate::config::client::ClientConfig;
pub use crate::config::log_service::LogServiceConfig;
pub use crate::config::observability::{LogConfig, LogOutput, ObservabilityConfig};
pub use crate::config::registry::{HeartbeatConfig, RegistryConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// 主配置结构体
///
/// 配置文件使用 TOML 格式，除 `name` 外所有段落都有默认值。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SvcregConfig {
    /// 实例名称
    ///
    /// 仅用于日志与启动信息展示，不参与服务发现。
    pub name: String,

    /// 运行环境标识
    ///
    /// - "dev": 开发环境
    /// - "prod": 生产环境
    /// - "test": 测试环境，用于自动化测试
    #[serde(default = "default_env")]
    pub env: String,

    /// 网络绑定配置
    #[serde(default)]
    pub bind: BindConfig,

    /// 注册中心配置（服务端与客户端共用）
    #[serde(default)]
    pub registry: RegistryConfig,

    /// 客户端配置（依赖声明、本地端点路径）
    #[serde(default)]
    pub client: ClientConfig,

    /// 日志服务配置
    #[serde(default)]
    pub log_service: LogServiceConfig,

    /// 可观测性配置
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_env() -> String {
    "dev".to_string()
}

impl Default for SvcregConfig {
    fn default() -> Self {
        Self {
            name: "svcreg-default".to_string(),
            env: default_env(),
            bind: BindConfig::default(),
            registry: RegistryConfig::default(),
            client: ClientConfig::default(),
            log_service: LogServiceConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SvcregConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::FileNotFound {
                path: path_ref.display().to_string(),
            });
        }

        if !path_ref.is_file() {
            return Err(ConfigError::NotAFile {
                path: path_ref.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path_ref)?;
        let config: SvcregConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 从 TOML 字符串加载配置
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 将配置序列化为 TOML 字符串
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// 验证配置有效性
    ///
    /// 以 "Warning:" 开头的条目只是提示，不阻止启动。
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Instance name cannot be empty".to_string());
        }

        if !["dev", "prod", "test"].contains(&self.env.as_str()) {
            errors.push(format!(
                "Invalid environment '{}', must be one of: dev, prod, test",
                self.env
            ));
        }

        if self.bind.http.port == 0 {
            errors.push(
                "Warning: bind.http.port is 0, the advertised URLs will not be reachable"
                    .to_string(),
            );
        }

        if let Err(e) = self.registry.validate() {
            errors.push(e);
        }

        for path in [&self.client.update_path, &self.client.heartbeat_path] {
            if !path.starts_with('/') {
                errors.push(format!("Client endpoint path '{path}' must start with '/'"));
            }
        }
        if self.client.update_path == self.client.heartbeat_path {
            errors.push(
                "client.update_path and client.heartbeat_path must be different".to_string(),
            );
        }
        if self.client.check_interval_secs == 0 {
            errors.push("client.check_interval_secs must be greater than 0".to_string());
        }

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceName;

    #[test]
    fn test_default_config() {
        let config = SvcregConfig::default();
        assert_eq!(config.env, "dev");
        assert_eq!(config.registry.url, "http://localhost:3000/services");
        assert_eq!(config.registry.heartbeat.interval_secs, 3);
        assert_eq!(config.registry.heartbeat.max_attempts, 3);
        assert_eq!(config.registry.heartbeat.retry_backoff_secs, 1);
        assert_eq!(config.client.check_interval_secs, 10);
        assert_eq!(config.registry.request_timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = SvcregConfig::from_toml(r#"name = "grading-1""#).unwrap();
        assert_eq!(config.name, "grading-1");
        assert_eq!(config.bind.http.port, 3000);
        assert_eq!(config.client.update_path, "/services");
        assert!(config.registry.notify_concurrency.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = SvcregConfig::default();
        config.client.required_services = vec![ServiceName::from("LogService")];
        config.registry.notify_concurrency = Some(8);

        let toml = config.to_toml().unwrap();
        let parsed = SvcregConfig::from_toml(&toml).unwrap();

        assert_eq!(parsed.client.required_services, config.client.required_services);
        assert_eq!(parsed.registry.notify_concurrency, Some(8));
    }

    #[test]
    fn test_full_toml() {
        let content = r#"
name = "grading"
env = "test"

[bind.http]
advertised_host = "h2"
ip = "0.0.0.0"
port = 6000

[registry]
url = "http://h0:3000/services"

[registry.heartbeat]
interval_secs = 5

[client]
required_services = ["LogService"]

[observability.log]
remote = true
"#;
        let config = SvcregConfig::from_toml(content).unwrap();
        assert_eq!(
            config.bind.http.public_url(config.bind.http.port),
            "http://h2:6000"
        );
        assert_eq!(config.bind.http.public_url(41234), "http://h2:41234");
        assert_eq!(config.bind.http.bind_addr(), "0.0.0.0:6000");
        assert_eq!(config.registry.heartbeat.interval_secs, 5);
        assert_eq!(config.registry.heartbeat.max_attempts, 3);
        assert_eq!(
            config.client.required_services,
            vec![ServiceName::from("LogService")]
        );
        assert!(config.observability.log.remote);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = \"registry\"\n[bind.http]\nport = 3000\n").unwrap();

        let config = SvcregConfig::from_file(&path).unwrap();
        assert_eq!(config.name, "registry");

        let missing = SvcregConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::FileNotFound { .. })));

        let not_a_file = SvcregConfig::from_file(dir.path());
        assert!(matches!(not_a_file, Err(ConfigError::NotAFile { .. })));

        std::fs::write(&path, "name = ").unwrap();
        assert!(matches!(
            SvcregConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_reports_errors() {
        let mut config = SvcregConfig::default();
        config.env = "staging".to_string();
        config.registry.url = "localhost:3000".to_string();
        config.client.heartbeat_path = "heartbeat".to_string();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| !e.starts_with("Warning:")));
    }

    #[test]
    fn test_validate_port_zero_is_warning() {
        let mut config = SvcregConfig::default();
        config.bind.http.port = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Warning:"));
    }
}
