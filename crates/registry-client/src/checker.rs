//! 依赖自检
//!
//! 周期性检查声明依赖的服务是否都有可用提供者，缺失时只记录告警。

use std::time::Duration;

use svcreg_common::ServiceName;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::providers::ProviderCache;

pub struct RequiredServiceChecker {
    cache: ProviderCache,
    required: Vec<ServiceName>,
    period: Duration,
}

impl RequiredServiceChecker {
    pub fn new(cache: ProviderCache, required: Vec<ServiceName>, period: Duration) -> Self {
        Self {
            cache,
            required,
            period,
        }
    }

    /// 当前缺失的依赖
    pub async fn missing(&self) -> Vec<ServiceName> {
        let mut missing = Vec::new();
        for name in &self.required {
            if !self.cache.has_provider(name).await {
                missing.push(name.clone());
            }
        }
        missing
    }

    /// 检查一次并记录缺失项
    pub async fn check_once(&self) -> Vec<ServiceName> {
        let missing = self.missing().await;
        for name in &missing {
            warn!("Missing required service {}", name);
        }
        missing
    }

    pub async fn run(self, cancel: CancellationToken) {
        if self.required.is_empty() {
            debug!("No required services declared, checker idle");
            return;
        }

        let mut ticker = interval(self.period);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.check_once().await;
                }
            }
        }
        debug!("Required service checker stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
