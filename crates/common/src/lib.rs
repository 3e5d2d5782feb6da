//! Base 基础设施库
//!
//! 为注册中心、注册中心客户端与日志服务提供共享的数据模型、配置与错误类型

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types for convenience
pub use config::SvcregConfig;
pub use error::{BaseError, ConfigError, NetworkError, Result};
pub use types::{GRADING_SERVICE, LOG_SERVICE, Patch, PatchEntry, Registration, ServiceName};
