//! 注册中心客户端配置

use crate::types::ServiceName;
use serde::{Deserialize, Serialize};

/// 客户端配置
///
/// 描述本实例依赖哪些服务，以及本地暴露给注册中心的端点路径。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 本实例依赖的服务名列表
    #[serde(default)]
    pub required_services: Vec<ServiceName>,

    /// 依赖缺失自检的间隔（秒）
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// 接收 patch 的路径
    #[serde(default = "default_update_path")]
    pub update_path: String,

    /// 心跳探测路径
    #[serde(default = "default_heartbeat_path")]
    pub heartbeat_path: String,
}

fn default_check_interval() -> u64 {
    10
}

fn default_update_path() -> String {
    "/services".to_string()
}

fn default_heartbeat_path() -> String {
    "/heartbeat".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            required_services: Vec::new(),
            check_interval_secs: default_check_interval(),
            update_path: default_update_path(),
            heartbeat_path: default_heartbeat_path(),
        }
    }
}
