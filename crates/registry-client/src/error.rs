//! 客户端错误定义

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use svcreg_common::ServiceName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// 本地缓存中没有该服务的可用提供者
    #[error("no provider available for service {0}")]
    NoProvider(ServiceName),

    /// 注册中心返回了非 200 状态码
    #[error("failed to {operation}: registry responded with {status}")]
    Status { operation: &'static str, status: u16 },

    /// 注册项中的 URL 无法用于挂载本地端点
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for ClientError {
    fn into_response(self) -> Response {
        let status = match &self {
            ClientError::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
