//! 服务注册中心
//!
//! - [`RegistrationStore`]: 以 URL 为主键的注册表
//! - [`PatchNotifier`]: bootstrap 与增量 patch 推送
//! - [`HeartbeatMonitor`]: 周期性存活探测与淘汰
//! - [`create_router`]: `/services` 的 POST / DELETE 端点

pub mod error;
pub mod handlers;
pub mod heartbeat;
pub mod notifier;
pub mod store;

pub use error::{RegistryError, Result};
pub use handlers::{RegistryState, create_registry_state, create_router};
pub use heartbeat::{HeartbeatMonitor, HttpProbe, LivenessProbe, RoundSummary};
pub use notifier::{HttpPatchSender, PatchNotifier, PatchSender};
pub use store::{RegistrationStore, TrackedRegistration};
