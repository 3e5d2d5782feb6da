//! 基础设施层错误
//!
//! 配置加载与监听地址相关的失败都收敛到 `BaseError`，上层 crate 只需要一个 `From`。

use super::{ConfigError, NetworkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl BaseError {
    /// 是否是启动阶段可以通过修改配置解决的问题
    pub fn is_config(&self) -> bool {
        match self {
            BaseError::Config(_) => true,
            BaseError::Network(NetworkError::InvalidAddress { .. }) => true,
            BaseError::Network(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: BaseError = ConfigError::FileNotFound {
            path: "missing.toml".to_string(),
        }
        .into();
        assert!(err.is_config());
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_bind_failure_is_not_config() {
        let err: BaseError = NetworkError::BindFailed {
            address: "127.0.0.1:3000".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        }
        .into();
        assert!(!err.is_config());

        let err: BaseError = NetworkError::InvalidAddress {
            address: "nowhere".to_string(),
        }
        .into();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalid_config_lists_all_errors() {
        let err = ConfigError::Invalid {
            errors: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Configuration validation failed: a; b");
    }
}
