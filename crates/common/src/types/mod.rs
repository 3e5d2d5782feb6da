//! 注册中心数据模型
//!
//! 服务名、注册项与增量补丁（patch）的定义。JSON 字段名沿用既有客户端使用的
//! 线上格式（`ServiceName`、`ServiceURL`、`Added` 等）。

mod patch;
mod registration;

pub use patch::{Patch, PatchEntry};
pub use registration::{GRADING_SERVICE, LOG_SERVICE, Registration, ServiceName};

use serde::{Deserialize, Deserializer};

/// 将 JSON `null` 解码为类型默认值（列表字段在线上可能是 `null`）
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
