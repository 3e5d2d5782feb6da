//! 日志服务错误定义

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogSinkError {
    #[error("empty log message")]
    EmptyMessage,

    #[error("log message is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to send log message. Service responded with {status}")]
    Status { status: u16 },
}

impl IntoResponse for LogSinkError {
    fn into_response(self) -> Response {
        let status = match &self {
            LogSinkError::EmptyMessage | LogSinkError::InvalidEncoding(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LogSinkError>;
