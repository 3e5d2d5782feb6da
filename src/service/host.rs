//! 业务服务宿主
//!
//! 负责一个服务实例的完整生命周期：绑定端口、挂载客户端端点、
//! 向注册中心注册、关闭时注销。

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use logsink::RemoteLogWriter;
use registry_client::{RegistryClient, client_router};
use svcreg_common::error::NetworkError;
use svcreg_common::{LOG_SERVICE, Registration, ServiceName, SvcregConfig};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::trace::http_trace_layer;
use crate::error::{Error, Result};

/// 已绑定端口、尚未注册的服务实例
pub struct ServiceHost {
    listener: TcpListener,
    local_addr: SocketAddr,
    registration: Registration,
    client: Arc<RegistryClient>,
    remote_log: Option<RemoteLogWriter>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ServiceHost {
    /// 绑定监听地址并生成注册项
    ///
    /// 对外地址使用 `advertised_host` 与实际绑定的端口，端口配置为 0 时同样可用。
    pub async fn bind(
        config: &SvcregConfig,
        service_name: impl Into<ServiceName>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Result<Self> {
        let bind_addr = config.bind.http.bind_addr();
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| NetworkError::InvalidAddress {
                address: bind_addr.clone(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| NetworkError::BindFailed {
                address: bind_addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let base_url = config.bind.http.public_url(local_addr.port());
        let registration = Registration::for_address(
            service_name,
            &base_url,
            config.client.required_services.clone(),
            &config.client.update_path,
            &config.client.heartbeat_path,
        );
        let client = Arc::new(RegistryClient::from_config(config)?);

        Ok(Self {
            listener,
            local_addr,
            registration,
            client,
            remote_log: None,
            shutdown_tx,
        })
    }

    /// 发现 LogService 后把日志同时转发过去
    pub fn with_remote_log(mut self, writer: RemoteLogWriter) -> Self {
        self.remote_log = Some(writer);
        self
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 启动 HTTP 服务并注册
    ///
    /// `router` 不能占用注册项中的更新路径与心跳路径。注册失败时广播关闭并返回错误。
    pub async fn serve(self, router: Router) -> Result<RunningService> {
        let Self {
            listener,
            local_addr,
            registration,
            client,
            remote_log,
            shutdown_tx,
        } = self;

        let service_name = registration.service_name.to_string();
        let app = client_router(client.cache().clone(), &registration)?
            .merge(router)
            .layer(http_trace_layer(&service_name));

        let handle = {
            let mut shutdown_rx = shutdown_tx.subscribe();
            let shutdown_tx = shutdown_tx.clone();
            let client = Arc::clone(&client);
            let service_url = registration.service_url.clone();
            let service_name = service_name.clone();

            tokio::spawn(async move {
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                    info!("{} received shutdown signal, deregistering", service_name);
                    if let Err(e) = client.deregister(&service_url).await {
                        warn!("Failed to deregister {}: {}", service_url, e);
                    }
                });
                if let Err(e) = server.await {
                    error!("HTTP server error: {}", NetworkError::Server(e));
                    let _ = shutdown_tx.send(());
                }
                info!("HTTP server stopped");
            })
        };

        info!("{} listening on {}", service_name, local_addr);

        if let Err(e) = client.register(&registration).await {
            error!("Failed to register {}: {}", service_name, e);
            let _ = shutdown_tx.send(());
            handle.abort();
            return Err(Error::startup(service_name, format!("registration failed: {e}")));
        }

        if let Some(writer) = remote_log {
            attach_remote_log(Arc::clone(&client), writer, shutdown_tx.subscribe());
        }

        Ok(RunningService {
            registration,
            client,
            local_addr,
            handle,
        })
    }
}

/// 轮询本地缓存直到出现 LogService 提供者
fn attach_remote_log(
    client: Arc<RegistryClient>,
    writer: RemoteLogWriter,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        let log_service = ServiceName::from(LOG_SERVICE);
        loop {
            if let Ok(url) = client.provider(&log_service).await {
                info!("Logging service found at: {}", url);
                writer.set_endpoint(&url);
                return;
            }
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            }
        }
    });
}

/// 已注册、正在运行的服务实例
pub struct RunningService {
    registration: Registration,
    client: Arc<RegistryClient>,
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RunningService {
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn client(&self) -> &Arc<RegistryClient> {
        &self.client
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 等待 HTTP 服务退出（关闭信号触发注销后）
    pub async fn wait(self) -> Result<()> {
        let result = self.handle.await;
        self.client.shutdown();
        result?;
        info!("{} stopped", self.registration.service_name);
        Ok(())
    }
}
