//! 注册中心客户端

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use svcreg_common::{Registration, ServiceName, SvcregConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::checker::RequiredServiceChecker;
use crate::error::{ClientError, Result};
use crate::providers::ProviderCache;

/// 注册中心客户端
///
/// 持有本实例的提供者缓存；第一次 [`register`](Self::register) 时启动依赖自检。
pub struct RegistryClient {
    http: reqwest::Client,
    registry_url: String,
    cache: ProviderCache,
    check_interval: Duration,
    checker_started: AtomicBool,
    cancel: CancellationToken,
}

impl RegistryClient {
    pub fn new(
        registry_url: impl Into<String>,
        request_timeout: Duration,
        check_interval: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            registry_url: registry_url.into(),
            cache: ProviderCache::new(),
            check_interval,
            checker_started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        })
    }

    pub fn from_config(config: &SvcregConfig) -> Result<Self> {
        Self::new(
            config.registry.url.clone(),
            Duration::from_secs(config.registry.request_timeout_secs),
            Duration::from_secs(config.client.check_interval_secs),
        )
    }

    pub fn cache(&self) -> &ProviderCache {
        &self.cache
    }

    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// 启动依赖自检，同一个客户端只会启动一次
    ///
    /// 返回本次调用是否真正启动了检查任务。
    pub fn start_checker(&self, registration: &Registration) -> bool {
        if self.checker_started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let checker = RequiredServiceChecker::new(
            self.cache.clone(),
            registration.required_services.clone(),
            self.check_interval,
        );
        checker.spawn(self.cancel.child_token());
        true
    }

    /// 向注册中心注册
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        self.start_checker(registration);

        debug!(
            "Registering {} at {} with {}",
            registration.service_name, registration.service_url, self.registry_url
        );
        let response = self
            .http
            .post(&self.registry_url)
            .json(registration)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::Status {
                operation: "register service",
                status: response.status().as_u16(),
            });
        }

        info!(
            "Registered {} at {}",
            registration.service_name, registration.service_url
        );
        Ok(())
    }

    /// 从注册中心注销
    pub async fn deregister(&self, service_url: &str) -> Result<()> {
        let response = self
            .http
            .delete(&self.registry_url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(service_url.to_string())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::Status {
                operation: "deregister service",
                status: response.status().as_u16(),
            });
        }

        info!("Deregistered {}", service_url);
        Ok(())
    }

    /// 随机选择 `name` 的一个提供者
    pub async fn provider(&self, name: &ServiceName) -> Result<String> {
        self.cache.get(name).await
    }

    /// 停止后台任务
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RegistryClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
