//! 注册中心 HTTP 处理器

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use svcreg_common::Registration;
use svcreg_common::config::RegistryConfig;
use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::heartbeat::{HeartbeatMonitor, HttpProbe};
use crate::notifier::{HttpPatchSender, PatchNotifier};
use crate::store::RegistrationStore;

/// 注册中心服务状态
#[derive(Clone)]
pub struct RegistryState {
    pub store: Arc<RegistrationStore>,
    pub monitor: HeartbeatMonitor,
}

/// 从配置创建注册中心状态
///
/// patch 推送与心跳探测使用同一个超时设置；心跳循环需要调用方另行启动。
pub fn create_registry_state(config: &RegistryConfig) -> Result<RegistryState> {
    info!("Initializing registry state");

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let sender = HttpPatchSender::new(timeout)?;
    let mut notifier = PatchNotifier::new(Arc::new(sender));
    if let Some(limit) = config.notify_concurrency {
        info!("Patch fan-out limited to {} concurrent requests", limit);
        notifier = notifier.with_concurrency_limit(limit);
    }

    let store = Arc::new(RegistrationStore::new(notifier));
    let probe = HttpProbe::new(timeout)?;
    let monitor = HeartbeatMonitor::new(Arc::clone(&store), Arc::new(probe), &config.heartbeat);

    Ok(RegistryState { store, monitor })
}

/// 创建注册中心路由
pub fn create_router(state: RegistryState) -> Router {
    Router::new()
        .route(
            "/services",
            post(register_handler).delete(deregister_handler),
        )
        .route("/health", get(health_check_handler))
        .with_state(state)
}

/// POST /services
///
/// 请求体为 JSON 编码的 [`Registration`]。
async fn register_handler(
    State(state): State<RegistryState>,
    body: Bytes,
) -> Result<StatusCode> {
    let registration: Registration = serde_json::from_slice(&body)?;
    info!(
        "Adding service: {} with URL: {}",
        registration.service_name, registration.service_url
    );

    state.store.add(registration).await?;
    Ok(StatusCode::OK)
}

/// DELETE /services
///
/// 请求体为纯文本 URL。
async fn deregister_handler(
    State(state): State<RegistryState>,
    body: Bytes,
) -> Result<StatusCode> {
    let url = std::str::from_utf8(&body)
        .map_err(|e| RegistryError::InvalidRequest(format!("body is not valid UTF-8: {e}")))?
        .trim();
    info!("Removing service at URL: {}", url);

    state.store.remove(url).await?;
    Ok(StatusCode::OK)
}

async fn health_check_handler(State(state): State<RegistryState>) -> Json<serde_json::Value> {
    debug!("Health check requested");

    Json(serde_json::json!({
        "status": "healthy",
        "service": "registry",
        "registrations": state.store.len().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::tests::RecordingSender;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use svcreg_common::config::HeartbeatConfig;
    use tower::ServiceExt;

    fn test_state() -> (RegistryState, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender::default());
        let store = Arc::new(RegistrationStore::new(PatchNotifier::new(sender.clone())));
        let probe = HttpProbe::new(Duration::from_secs(1)).unwrap();
        let monitor = HeartbeatMonitor::new(
            Arc::clone(&store),
            Arc::new(probe),
            &HeartbeatConfig::default(),
        );
        (RegistryState { store, monitor }, sender)
    }

    fn request(method: Method, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/services")
            .body(body.into())
            .unwrap()
    }

    const LOG_SERVICE_JSON: &str = r#"{"ServiceName":"LogService","ServiceURL":"http://h1:4000","RequiredServices":[],"ServiceUpdateURL":"http://h1:4000/services","HeartbeatURL":"http://h1:4000/heartbeat"}"#;

    #[tokio::test]
    async fn test_register_and_deregister() {
        let (state, sender) = test_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(request(Method::POST, LOG_SERVICE_JSON))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.store.find("http://h1:4000").await.is_some());
        assert_eq!(sender.sent_to("http://h1:4000/services").len(), 1);

        let response = app
            .oneshot(request(Method::DELETE, "http://h1:4000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_registration() {
        let (state, _) = test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(request(Method::POST, "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_bad_request() {
        let (state, sender) = test_state();
        sender.fail_on("http://h1:4000/services");
        let app = create_router(state.clone());

        let response = app
            .oneshot(request(Method::POST, LOG_SERVICE_JSON))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_deregister_unknown_url() {
        let (state, _) = test_state();
        let app = create_router(state);

        let response = app
            .oneshot(request(Method::DELETE, "http://nowhere:1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 500);
    }

    #[tokio::test]
    async fn test_deregister_invalid_utf8() {
        let (state, _) = test_state();
        let app = create_router(state);

        let response = app
            .oneshot(request(Method::DELETE, vec![0xff_u8, 0xfe]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let (state, _) = test_state();
        let app = create_router(state);

        let response = app.oneshot(request(Method::GET, "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
