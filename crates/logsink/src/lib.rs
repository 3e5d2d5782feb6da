//! 集中式日志服务
//!
//! - [`FileLog`] / [`create_router`]: 日志服务端，`POST /log` 追加写入文件
//! - [`RemoteLogWriter`]: 业务服务端，把 tracing 输出转发给日志服务

pub mod error;
pub mod file;
pub mod handlers;
pub mod remote;

pub use error::{LogSinkError, Result};
pub use file::FileLog;
pub use handlers::create_router;
pub use remote::{RemoteLine, RemoteLogShipper, RemoteLogWriter};
