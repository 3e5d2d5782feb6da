//! 本地提供者缓存
//!
//! 镜像注册中心里与本实例相关的那部分注册信息，只通过 patch 增量更新。

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use svcreg_common::{Patch, ServiceName};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ClientError, Result};

/// 服务名 -> 提供者 URL 列表
#[derive(Debug, Clone, Default)]
pub struct ProviderCache {
    providers: Arc<RwLock<HashMap<ServiceName, Vec<String>>>>,
}

impl ProviderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一个 patch
    ///
    /// 先处理 `Added`（追加到对应列表末尾），再处理 `Removed`（删除第一个匹配的 URL）。
    /// 删除后列表为空时保留空列表。
    pub async fn apply(&self, patch: &Patch) {
        let mut providers = self.providers.write().await;

        for entry in &patch.added {
            providers
                .entry(entry.name.clone())
                .or_default()
                .push(entry.url.clone());
        }

        for entry in &patch.removed {
            if let Some(urls) = providers.get_mut(&entry.name)
                && let Some(index) = urls.iter().position(|url| *url == entry.url)
            {
                urls.remove(index);
            }
        }

        debug!(
            "Applied patch: +{} -{}",
            patch.added.len(),
            patch.removed.len()
        );
    }

    /// 随机选择一个提供者
    pub async fn get(&self, name: &ServiceName) -> Result<String> {
        let providers = self.providers.read().await;
        match providers.get(name) {
            Some(urls) if !urls.is_empty() => {
                let index = rand::rng().random_range(0..urls.len());
                Ok(urls[index].clone())
            }
            _ => Err(ClientError::NoProvider(name.clone())),
        }
    }

    /// 是否至少有一个提供者
    pub async fn has_provider(&self, name: &ServiceName) -> bool {
        self.providers
            .read()
            .await
            .get(name)
            .is_some_and(|urls| !urls.is_empty())
    }

    pub async fn urls(&self, name: &ServiceName) -> Vec<String> {
        self.providers
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> HashMap<ServiceName, Vec<String>> {
        self.providers.read().await.clone()
    }
}
