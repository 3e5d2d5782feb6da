//! 服务运行模块
//!
//! - `RegistryServer`: 注册中心（`/services` + 心跳淘汰）
//! - `ServiceHost`: 普通服务实例的启动、注册与注销
//! - `trace`: HTTP 请求追踪层

pub mod host;
pub mod registry_server;
pub mod trace;

pub use host::{RunningService, ServiceHost};
pub use registry_server::RegistryServer;
