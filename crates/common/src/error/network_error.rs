//! 网络相关错误类型
//!
//! 定义所有与监听、连接、地址解析相关的错误

use thiserror::Error;

/// 网络相关错误
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Invalid address format: {address}")]
    InvalidAddress { address: String },

    #[error("Failed to bind {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Server(std::io::Error),
}
