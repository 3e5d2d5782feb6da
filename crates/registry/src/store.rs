//! 注册表
//!
//! 以 URL 为主键保存所有在线实例。写操作在写锁内完成查找与修改，
//! 锁释放后再进行网络推送。

use std::sync::Arc;

use svcreg_common::{Patch, PatchEntry, Registration};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::notifier::PatchNotifier;

/// 带代号的注册项
///
/// 每次 `add`（包括同 URL 的重新注册）都会分配新的代号，
/// 心跳淘汰据此只移除自己探测过的那一次注册。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRegistration {
    pub generation: u64,
    pub registration: Registration,
}

#[derive(Default)]
struct Table {
    entries: Vec<TrackedRegistration>,
    next_generation: u64,
}

impl Table {
    fn registrations(&self) -> Vec<Registration> {
        self.entries.iter().map(|e| e.registration.clone()).collect()
    }

    fn position(&self, service_url: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.registration.service_url == service_url)
    }
}

/// 注册表
pub struct RegistrationStore {
    table: Arc<RwLock<Table>>,
    notifier: PatchNotifier,
}

impl RegistrationStore {
    pub fn new(notifier: PatchNotifier) -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
            notifier,
        }
    }

    pub fn notifier(&self) -> &PatchNotifier {
        &self.notifier
    }

    /// 添加注册项
    ///
    /// 1. 写入注册表（同 URL 的旧注册项被原地替换）
    /// 2. 同步向新实例发送 bootstrap patch，包含它依赖的所有现有提供者
    /// 3. 向其它依赖该服务名的实例异步广播 Added
    ///
    /// 返回 bootstrap 发送的结果；发送失败时注册项仍然保留。
    pub async fn add(&self, registration: Registration) -> Result<()> {
        let (superseded, snapshot) = {
            let mut table = self.table.write().await;
            let entry = TrackedRegistration {
                generation: table.next_generation,
                registration: registration.clone(),
            };
            table.next_generation += 1;

            let superseded = match table.position(&registration.service_url) {
                Some(index) => {
                    Some(std::mem::replace(&mut table.entries[index], entry).registration)
                }
                None => {
                    table.entries.push(entry);
                    None
                }
            };
            (superseded, table.registrations())
        };

        match &superseded {
            Some(old) => info!(
                "Re-registered {} at {} (was {})",
                registration.service_name, registration.service_url, old.service_name
            ),
            None => info!(
                "Registered {} at {}",
                registration.service_name, registration.service_url
            ),
        }

        let bootstrap = bootstrap_patch(&registration, &snapshot);
        let result = self
            .notifier
            .send_bootstrap(&bootstrap, &registration.service_update_url)
            .await;

        let delta = match superseded {
            Some(old) if old.service_name == registration.service_name => None,
            Some(old) => Some(Patch {
                added: vec![PatchEntry::from(&registration)],
                removed: vec![PatchEntry::from(&old)],
            }),
            None => Some(Patch::added(vec![PatchEntry::from(&registration)])),
        };

        if let Some(delta) = delta {
            let others: Vec<Registration> = snapshot
                .into_iter()
                .filter(|r| r.service_url != registration.service_url)
                .collect();
            let dispatched = self.notifier.notify(&delta, &others);
            debug!(
                "Broadcast registration of {} to {} dependents",
                registration.service_name, dispatched
            );
        }

        result
    }

    /// 按 URL 移除注册项，并向依赖方广播 Removed
    ///
    /// 查找与删除在同一个写锁内完成，并发移除同一 URL 时只有一个调用成功。
    pub async fn remove(&self, service_url: &str) -> Result<Registration> {
        let (removed, remaining) = {
            let mut table = self.table.write().await;
            let index = table
                .position(service_url)
                .ok_or_else(|| RegistryError::NotFound(service_url.to_string()))?;
            let removed = table.entries.remove(index).registration;
            (removed, table.registrations())
        };

        self.broadcast_removal(&removed, &remaining);
        Ok(removed)
    }

    /// 只在注册项仍是 `tracked` 那一代时移除
    ///
    /// 已被注销或已被同 URL 的新注册替换时返回 `None`，注册表保持不变。
    pub async fn evict(&self, tracked: &TrackedRegistration) -> Option<Registration> {
        let (removed, remaining) = {
            let mut table = self.table.write().await;
            let index = table.entries.iter().position(|e| {
                e.generation == tracked.generation
                    && e.registration.service_url == tracked.registration.service_url
            })?;
            let removed = table.entries.remove(index).registration;
            (removed, table.registrations())
        };

        self.broadcast_removal(&removed, &remaining);
        Some(removed)
    }

    fn broadcast_removal(&self, removed: &Registration, remaining: &[Registration]) {
        info!(
            "Removed {} at {}",
            removed.service_name, removed.service_url
        );

        let delta = Patch::removed(vec![PatchEntry::from(removed)]);
        let dispatched = self.notifier.notify(&delta, remaining);
        debug!(
            "Broadcast removal of {} to {} dependents",
            removed.service_name, dispatched
        );
    }

    /// 当前注册表的快照
    pub async fn snapshot(&self) -> Vec<Registration> {
        self.table.read().await.registrations()
    }

    /// 带代号的快照，供心跳检测使用
    pub async fn tracked_snapshot(&self) -> Vec<TrackedRegistration> {
        self.table.read().await.entries.clone()
    }

    /// 按 URL 查找注册项
    pub async fn find(&self, service_url: &str) -> Option<Registration> {
        let table = self.table.read().await;
        table
            .position(service_url)
            .map(|index| table.entries[index].registration.clone())
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.entries.is_empty()
    }
}

/// 新实例依赖的所有现有提供者，按注册顺序排列
fn bootstrap_patch(registration: &Registration, table: &[Registration]) -> Patch {
    Patch::added(
        table
            .iter()
            .filter(|r| registration.requires(&r.service_name))
            .map(PatchEntry::from)
            .collect(),
    )
}
