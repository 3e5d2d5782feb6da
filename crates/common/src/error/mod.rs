//! svcreg 基础错误类型，每类一个文件

mod base_error;
mod config_error;
mod network_error;

pub use base_error::{BaseError, Result};
pub use config_error::ConfigError;
pub use network_error::NetworkError;
