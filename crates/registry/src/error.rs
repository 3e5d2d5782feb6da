//! 注册中心错误定义

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// 注册中心错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    /// 注销或淘汰时找不到对应 URL 的注册项
    ///
    /// 属于预期内的情况：实例可能在被心跳淘汰之后才发起注销。
    #[error("service at url {0} not found")]
    NotFound(String),

    /// 无效的请求体
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP 客户端错误（连接失败、超时等）
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// 对端返回了非预期的状态码
    #[error("{url} responded with status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegistryError::InvalidRequest(_) | RegistryError::Json(_) => StatusCode::BAD_REQUEST,
            // 注册已写入，但 bootstrap patch 没能送达注册方
            RegistryError::HttpClient(_) | RegistryError::UnexpectedStatus { .. } => {
                StatusCode::BAD_REQUEST
            }
            RegistryError::NotFound(_) | RegistryError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// 注册中心结果类型别名
pub type Result<T> = std::result::Result<T, RegistryError>;
