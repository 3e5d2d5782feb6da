use serde::{Deserialize, Serialize};
use std::fmt;

/// 服务名称，仅按相等比较
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ServiceName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 日志服务
pub const LOG_SERVICE: &str = "LogService";

/// 成绩服务
pub const GRADING_SERVICE: &str = "GradingService";

/// 服务注册项
///
/// 描述一个服务实例及其依赖。`service_url` 是注册项的唯一键：同名服务可以有
/// 多个实例（水平扩展），但同一时刻每个 URL 最多只有一个存活注册项。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "ServiceName")]
    pub service_name: ServiceName,

    #[serde(rename = "ServiceURL")]
    pub service_url: String,

    /// 该实例依赖的服务（按声明顺序）
    #[serde(
        rename = "RequiredServices",
        default,
        deserialize_with = "super::null_as_default"
    )]
    pub required_services: Vec<ServiceName>,

    /// 实例暴露的 patch 接收地址
    #[serde(rename = "ServiceUpdateURL")]
    pub service_update_url: String,

    /// 实例暴露的心跳探测地址
    #[serde(rename = "HeartbeatURL")]
    pub heartbeat_url: String,
}

impl Registration {
    /// 根据实例自身的监听地址推导 patch 接收地址与心跳地址
    ///
    /// `update_path` / `heartbeat_path` 以 `/` 开头，例如 `/services`、`/heartbeat`。
    pub fn for_address(
        service_name: impl Into<ServiceName>,
        base_url: &str,
        required_services: Vec<ServiceName>,
        update_path: &str,
        heartbeat_path: &str,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            service_name: service_name.into(),
            service_url: base.to_string(),
            required_services,
            service_update_url: format!("{base}{update_path}"),
            heartbeat_url: format!("{base}{heartbeat_path}"),
        }
    }

    /// 是否声明依赖 `name`
    pub fn requires(&self, name: &ServiceName) -> bool {
        self.required_services.iter().any(|required| required == name)
    }
}
