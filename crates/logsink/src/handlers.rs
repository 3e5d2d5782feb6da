//! 日志服务 HTTP 处理器

use std::sync::Arc;

use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use tracing::debug;

use crate::error::{LogSinkError, Result};
use crate::file::FileLog;

/// 创建日志服务路由：`POST /log`，请求体为纯文本日志
pub fn create_router(log: Arc<FileLog>) -> Router {
    Router::new()
        .route("/log", post(write_log_handler))
        .with_state(log)
}

async fn write_log_handler(State(log): State<Arc<FileLog>>, body: Bytes) -> Result<StatusCode> {
    if body.is_empty() {
        return Err(LogSinkError::EmptyMessage);
    }
    let message = std::str::from_utf8(&body)?;

    let written = log.write(message).await?;
    debug!("Appended {} bytes to {}", written, log.path().display());
    Ok(StatusCode::OK)
}
