pub mod http;

pub use crate::config::bind::http::HttpBindConfig;
use serde::{Deserialize, Serialize};

/// 网络绑定配置
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BindConfig {
    /// HTTP 服务绑定配置
    ///
    /// 注册中心、日志服务以及各客户端的 patch/心跳端点都挂在这个监听地址上。
    #[serde(default)]
    pub http: HttpBindConfig,
}
