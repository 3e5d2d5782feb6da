//! Patch 推送
//!
//! bootstrap patch 在注册请求内同步发送，结果返回给调用方；
//! 变更广播则为每个受影响的接收方派生独立任务，调用方不等待。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use svcreg_common::{Patch, Registration};
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

/// Patch 发送通道
///
/// 生产环境使用 [`HttpPatchSender`]，测试中可替换为内存实现。
#[async_trait]
pub trait PatchSender: Send + Sync + 'static {
    /// 把 patch 投递到接收方的更新端点
    async fn send(&self, patch: &Patch, update_url: &str) -> Result<()>;
}

/// 通过 HTTP POST JSON 发送 patch
#[derive(Debug, Clone)]
pub struct HttpPatchSender {
    client: reqwest::Client,
}

impl HttpPatchSender {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PatchSender for HttpPatchSender {
    async fn send(&self, patch: &Patch, update_url: &str) -> Result<()> {
        let response = self.client.post(update_url).json(patch).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::UnexpectedStatus {
                url: update_url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Patch 分发器
#[derive(Clone)]
pub struct PatchNotifier {
    sender: Arc<dyn PatchSender>,
    limiter: Option<Arc<Semaphore>>,
    tracker: TaskTracker,
}

impl PatchNotifier {
    pub fn new(sender: Arc<dyn PatchSender>) -> Self {
        Self {
            sender,
            limiter: None,
            tracker: TaskTracker::new(),
        }
    }

    /// 限制同时进行中的推送数量
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.limiter = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    /// 同步发送 bootstrap patch，错误返回给调用方
    pub async fn send_bootstrap(&self, patch: &Patch, update_url: &str) -> Result<()> {
        debug!(
            "Sending bootstrap patch to {} ({} providers)",
            update_url,
            patch.added.len()
        );
        self.sender.send(patch, update_url).await
    }

    /// 向受影响的接收方广播增量 patch
    ///
    /// 每个接收方只会收到它声明依赖的条目，不受影响的接收方不发送。
    /// 返回派生的推送任务数。
    pub fn notify(&self, delta: &Patch, recipients: &[Registration]) -> usize {
        let mut dispatched = 0;

        for recipient in recipients {
            let Some(patch) = delta.filter_for(recipient) else {
                continue;
            };

            let sender = Arc::clone(&self.sender);
            let limiter = self.limiter.clone();
            let update_url = recipient.service_update_url.clone();
            let service_name = recipient.service_name.clone();

            self.tracker.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                debug!(
                    "Pushing patch to {} at {}: +{} -{}",
                    service_name,
                    update_url,
                    patch.added.len(),
                    patch.removed.len()
                );
                if let Err(e) = sender.send(&patch, &update_url).await {
                    warn!("Failed to push patch to {} at {}: {}", service_name, update_url, e);
                }
            });
            dispatched += 1;
        }

        dispatched
    }

    /// 等待所有已派生的推送完成
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// 当前未完成的推送数
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}
