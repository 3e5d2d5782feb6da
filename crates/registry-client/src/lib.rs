//! 服务注册客户端
//!
//! 每个业务服务实例内嵌一份：
//! - [`ProviderCache`]: 依赖服务的本地提供者表
//! - [`RequiredServiceChecker`]: 依赖缺失告警
//! - [`RegistryClient`]: 注册、注销与提供者查询
//! - [`client_router`]: 注册中心回调的本地端点

pub mod checker;
pub mod client;
pub mod error;
pub mod handlers;
pub mod providers;

pub use checker::RequiredServiceChecker;
pub use client::RegistryClient;
pub use error::{ClientError, Result};
pub use handlers::client_router;
pub use providers::ProviderCache;
