//! 注册中心服务

use std::net::SocketAddr;

use registry::{RegistryState, create_registry_state, create_router};
use svcreg_common::SvcregConfig;
use svcreg_common::error::NetworkError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::trace::http_trace_layer;
use crate::error::Result;

/// 正在运行的注册中心：`/services` 端点 + 心跳循环
pub struct RegistryServer {
    state: RegistryState,
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RegistryServer {
    pub async fn start(config: &SvcregConfig, shutdown_tx: broadcast::Sender<()>) -> Result<Self> {
        let state = create_registry_state(&config.registry)?;

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

        let cancel = CancellationToken::new();
        let heartbeat = state.monitor.clone().spawn(cancel.clone());
        let app = create_router(state.clone()).layer(http_trace_layer("RegistryService"));

        let handle = {
            let mut shutdown_rx = shutdown_tx.subscribe();
            tokio::spawn(async move {
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                    info!("Registry server received shutdown signal");
                });
                if let Err(e) = server.await {
                    error!("HTTP server error: {}", NetworkError::Server(e));
                    let _ = shutdown_tx.send(());
                }

                cancel.cancel();
                if let Err(e) = heartbeat.await {
                    error!("Heartbeat monitor terminated unexpectedly: {}", e);
                }
                info!("Registry server stopped");
            })
        };

        info!("RegistryService listening on {}", local_addr);
        Ok(Self {
            state,
            local_addr,
            handle,
        })
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `/services` 端点的完整 URL
    pub fn services_url(&self) -> String {
        format!("http://{}/services", self.local_addr)
    }

    pub async fn wait(self) -> Result<()> {
        self.handle.await?;
        Ok(())
    }
}
