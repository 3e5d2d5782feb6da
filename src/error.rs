//! svcreg 二进制的顶层错误
//!
//! 各子 crate 的错误通过 `From` 汇入 `Error`，`main` 只处理这一种类型。

use svcreg_common::error::{BaseError, ConfigError, NetworkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// 配置加载、地址解析与端口绑定
    #[error(transparent)]
    Base(Box<BaseError>),

    #[error("Registry error: {0}")]
    Registry(#[from] registry::RegistryError),

    #[error("Registry client error: {0}")]
    Client(#[from] registry_client::ClientError),

    #[error("Log service error: {0}")]
    LogSink(#[from] logsink::LogSinkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP 服务或心跳任务 panic / 被取消
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// `test` 子命令或启动前检查拒绝了配置
    #[error("{reason}")]
    ConfigRejected { reason: String },

    /// 注册失败等启动期致命错误
    #[error("{service} failed to start: {reason}")]
    Startup { service: String, reason: String },
}

impl From<BaseError> for Error {
    fn from(err: BaseError) -> Self {
        Error::Base(Box::new(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Base(Box::new(err.into()))
    }
}

impl From<NetworkError> for Error {
    fn from(err: NetworkError) -> Self {
        Error::Base(Box::new(err.into()))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config_rejected(reason: impl Into<String>) -> Self {
        Self::ConfigRejected {
            reason: reason.into(),
        }
    }

    pub fn startup(service: impl Into<String>, reason: impl ToString) -> Self {
        Self::Startup {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// 修改配置即可解决的错误
    pub fn is_config(&self) -> bool {
        match self {
            Error::Base(base) => base.is_config(),
            Error::ConfigNotFound { .. } | Error::ConfigRejected { .. } => true,
            _ => false,
        }
    }
}
