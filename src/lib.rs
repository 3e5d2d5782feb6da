//! # svcreg
//!
//! 分布式服务注册与发现：注册中心、集中式日志服务与业务服务运行时

pub mod error;
pub mod observability;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use service::{RegistryServer, RunningService, ServiceHost};
pub use svcreg_common::SvcregConfig;
