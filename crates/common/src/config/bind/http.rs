use serde::{Deserialize, Serialize};

/// HTTP 服务绑定配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpBindConfig {
    /// 对外宣告的主机名
    ///
    /// 用于拼出注册到注册中心的 ServiceURL / ServiceUpdateURL / HeartbeatURL，
    /// 其他实例通过它回连本实例。
    #[serde(default = "default_advertised_host")]
    pub advertised_host: String,

    /// 绑定 IP 地址
    ///
    /// 服务实际绑定的网络接口 IP 地址。
    #[serde(default = "default_ip")]
    pub ip: String,

    /// 绑定端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_advertised_host() -> String {
    "localhost".to_string()
}

fn default_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for HttpBindConfig {
    fn default() -> Self {
        Self {
            advertised_host: default_advertised_host(),
            ip: default_ip(),
            port: default_port(),
        }
    }
}

impl HttpBindConfig {
    /// 监听地址，形如 `127.0.0.1:3000`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// 对外地址，形如 `http://localhost:3000`
    ///
    /// `bound_port` 为监听器实际绑定的端口，配置端口为 0 时两者不同。
    pub fn public_url(&self, bound_port: u16) -> String {
        format!("http://{}:{}", self.advertised_host, bound_port)
    }
}
