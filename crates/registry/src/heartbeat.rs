//! 心跳检测
//!
//! 每轮并发探测所有注册项，一轮全部结束后才开始计时下一轮。
//! 单个实例在一轮内连续失败 `max_attempts` 次即被淘汰。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use svcreg_common::config::HeartbeatConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::store::{RegistrationStore, TrackedRegistration};

/// 存活探测
#[async_trait]
pub trait LivenessProbe: Send + Sync + 'static {
    /// 实例存活时返回 `Ok(())`
    async fn probe(&self, heartbeat_url: &str) -> Result<()>;
}

/// HTTP GET 探测，只有 200 视为存活
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn probe(&self, heartbeat_url: &str) -> Result<()> {
        let response = self.client.get(heartbeat_url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RegistryError::UnexpectedStatus {
                url: heartbeat_url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// 一轮检测的结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub healthy: usize,
    /// 本轮实际移除的 URL
    pub evicted: Vec<String>,
    /// 探测失败，但注册项已被注销或被重新注册替换
    pub stale: usize,
}

enum Outcome {
    Alive,
    Evicted,
    Stale,
}

/// 心跳监控器
#[derive(Clone)]
pub struct HeartbeatMonitor {
    store: Arc<RegistrationStore>,
    probe: Arc<dyn LivenessProbe>,
    interval: Duration,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl HeartbeatMonitor {
    pub fn new(
        store: Arc<RegistrationStore>,
        probe: Arc<dyn LivenessProbe>,
        config: &HeartbeatConfig,
    ) -> Self {
        Self {
            store,
            probe,
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_secs(config.retry_backoff_secs),
        }
    }

    /// 执行一轮检测
    ///
    /// 基于轮次开始时的快照；返回前所有被判定失败的实例都已从注册表移除，
    /// 轮次期间重新注册的实例不受影响。
    pub async fn run_round(&self) -> RoundSummary {
        let snapshot = self.store.tracked_snapshot().await;
        if snapshot.is_empty() {
            return RoundSummary::default();
        }

        debug!("Heartbeat round over {} registrations", snapshot.len());
        let outcomes = join_all(snapshot.iter().map(|reg| self.check(reg))).await;

        let mut summary = RoundSummary::default();
        for (tracked, outcome) in snapshot.iter().zip(outcomes) {
            match outcome {
                Outcome::Alive => summary.healthy += 1,
                Outcome::Evicted => summary
                    .evicted
                    .push(tracked.registration.service_url.clone()),
                Outcome::Stale => summary.stale += 1,
            }
        }
        summary
    }

    /// 检测单个实例，失败时直接淘汰
    async fn check(&self, tracked: &TrackedRegistration) -> Outcome {
        let registration = &tracked.registration;
        for attempt in 1..=self.max_attempts {
            match self.probe.probe(&registration.heartbeat_url).await {
                Ok(()) => {
                    debug!(
                        "Heartbeat check passed for {}",
                        registration.service_name
                    );
                    return Outcome::Alive;
                }
                Err(e) => {
                    warn!(
                        "Heartbeat check failed for {} ({}/{}): {}",
                        registration.service_name, attempt, self.max_attempts, e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }

        match self.store.evict(tracked).await {
            Some(_) => {
                info!(
                    "Evicted {} at {} after {} failed heartbeats",
                    registration.service_name, registration.service_url, self.max_attempts
                );
                Outcome::Evicted
            }
            None => {
                info!(
                    "Skipped eviction of {} at {}: deregistered or re-registered during the round",
                    registration.service_name, registration.service_url
                );
                Outcome::Stale
            }
        }
    }

    /// 循环检测直到取消
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Heartbeat monitor started (interval {:?}, {} attempts)",
            self.interval, self.max_attempts
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                summary = self.run_round() => {
                    if !summary.evicted.is_empty() {
                        info!("Heartbeat round evicted {} services", summary.evicted.len());
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Heartbeat monitor stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
