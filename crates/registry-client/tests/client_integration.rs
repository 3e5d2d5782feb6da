use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use registry_client::{ClientError, RegistryClient, client_router};
use svcreg_common::{Registration, ServiceName};
use tokio::net::TcpListener;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read bound addr");
    let base_url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("test server exited unexpectedly");
    });

    TestServer { base_url, handle }
}

/// 记录请求的假注册中心
#[derive(Clone)]
struct FakeRegistry {
    registered: Arc<Mutex<Vec<Registration>>>,
    deregistered: Arc<Mutex<Vec<String>>>,
    status: StatusCode,
}

impl FakeRegistry {
    fn new(status: StatusCode) -> Self {
        Self {
            registered: Arc::default(),
            deregistered: Arc::default(),
            status,
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/services", post(register).delete(deregister))
            .with_state(self.clone())
    }
}

async fn register(State(registry): State<FakeRegistry>, body: Bytes) -> StatusCode {
    let reg: Registration = serde_json::from_slice(&body).expect("registration json");
    registry.registered.lock().unwrap().push(reg);
    registry.status
}

async fn deregister(State(registry): State<FakeRegistry>, body: Bytes) -> StatusCode {
    let url = String::from_utf8(body.to_vec()).expect("utf8 body");
    registry.deregistered.lock().unwrap().push(url);
    registry.status
}

fn client_for(server: &TestServer) -> RegistryClient {
    RegistryClient::new(
        format!("{}/services", server.base_url),
        Duration::from_secs(5),
        Duration::from_secs(10),
    )
    .expect("client")
}

fn grading() -> Registration {
    Registration::for_address(
        "GradingService",
        "http://h2:6000",
        vec![ServiceName::from("LogService")],
        "/services",
        "/heartbeat",
    )
}

#[tokio::test]
async fn test_register_and_deregister() {
    let registry = FakeRegistry::new(StatusCode::OK);
    let server = serve(registry.router()).await;
    let client = client_for(&server);

    client.register(&grading()).await.expect("register");
    assert_eq!(registry.registered.lock().unwrap().clone(), vec![grading()]);

    client
        .deregister("http://h2:6000")
        .await
        .expect("deregister");
    assert_eq!(
        registry.deregistered.lock().unwrap().clone(),
        vec!["http://h2:6000".to_string()]
    );
}

#[tokio::test]
async fn test_register_rejected() {
    let registry = FakeRegistry::new(StatusCode::BAD_REQUEST);
    let server = serve(registry.router()).await;
    let client = client_for(&server);

    let err = client.register(&grading()).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));

    let err = client.deregister("http://h2:6000").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
}

#[tokio::test]
async fn test_checker_started_once() {
    let registry = FakeRegistry::new(StatusCode::OK);
    let server = serve(registry.router()).await;
    let client = client_for(&server);

    assert!(client.start_checker(&grading()));
    assert!(!client.start_checker(&grading()));
    client.register(&grading()).await.expect("register");
    assert!(!client.start_checker(&grading()));
    client.shutdown();
}

#[tokio::test]
async fn test_update_endpoint_feeds_provider_lookup() {
    let registry = FakeRegistry::new(StatusCode::OK);
    let server = serve(registry.router()).await;
    let client = client_for(&server);

    let local = serve(client_router(client.cache().clone(), &grading()).expect("router")).await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/services", local.base_url))
        .json(&serde_json::json!({
            "Added": [{"Name": "LogService", "URL": "http://h1:4000"}],
            "Removed": []
        }))
        .send()
        .await
        .expect("patch post");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let heartbeat = http
        .get(format!("{}/heartbeat", local.base_url))
        .send()
        .await
        .expect("heartbeat");
    assert_eq!(heartbeat.status(), reqwest::StatusCode::OK);

    assert_eq!(
        client
            .provider(&ServiceName::from("LogService"))
            .await
            .expect("provider"),
        "http://h1:4000"
    );
    assert!(matches!(
        client.provider(&ServiceName::from("GradingService")).await,
        Err(ClientError::NoProvider(_))
    ));
}
