//! 客户端本地端点
//!
//! 注册中心通过这两个端点推送 patch 和探测存活。

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use svcreg_common::{Patch, Registration};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};
use crate::providers::ProviderCache;

/// 按注册项中的 URL 挂载 patch 接收端点与心跳端点
pub fn client_router(cache: ProviderCache, registration: &Registration) -> Result<Router> {
    let update_path = endpoint_path(&registration.service_update_url)?;
    let heartbeat_path = endpoint_path(&registration.heartbeat_url)?;

    if update_path == heartbeat_path {
        return Err(ClientError::InvalidUrl {
            url: registration.heartbeat_url.clone(),
            reason: "heartbeat endpoint must differ from the update endpoint".to_string(),
        });
    }

    Ok(Router::new()
        .route(&update_path, post(update_handler))
        .route(&heartbeat_path, get(heartbeat_handler))
        .with_state(cache))
}

fn endpoint_path(raw: &str) -> Result<String> {
    let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url.path().to_string())
}

async fn update_handler(State(cache): State<ProviderCache>, body: Bytes) -> Result<StatusCode> {
    let patch: Patch = serde_json::from_slice(&body)?;
    debug!("Received provider update: {:?}", patch);

    cache.apply(&patch).await;
    Ok(StatusCode::OK)
}

async fn heartbeat_handler() -> StatusCode {
    StatusCode::OK
}
