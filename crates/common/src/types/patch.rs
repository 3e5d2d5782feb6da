use super::registration::{Registration, ServiceName};
use serde::{Deserialize, Serialize};

/// 一条提供者事实：名为 `name` 的服务可在 `url` 访问
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchEntry {
    #[serde(rename = "Name")]
    pub name: ServiceName,

    #[serde(rename = "URL")]
    pub url: String,
}

impl PatchEntry {
    pub fn new(name: impl Into<ServiceName>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl From<&Registration> for PatchEntry {
    fn from(reg: &Registration) -> Self {
        Self {
            name: reg.service_name.clone(),
            url: reg.service_url.clone(),
        }
    }
}

/// 增量补丁
///
/// 只描述变化，接收方必须增量应用，不能用它替换本地表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(rename = "Added", default, deserialize_with = "super::null_as_default")]
    pub added: Vec<PatchEntry>,

    #[serde(
        rename = "Removed",
        default,
        deserialize_with = "super::null_as_default"
    )]
    pub removed: Vec<PatchEntry>,
}

impl Patch {
    pub fn added(entries: Vec<PatchEntry>) -> Self {
        Self {
            added: entries,
            removed: Vec::new(),
        }
    }

    pub fn removed(entries: Vec<PatchEntry>) -> Self {
        Self {
            added: Vec::new(),
            removed: entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// 截取 `reg` 关心的部分：只保留其依赖列表中出现的服务
    ///
    /// 返回 `None` 表示该注册项不受这次变化影响。
    pub fn filter_for(&self, reg: &Registration) -> Option<Patch> {
        let keep = |entry: &&PatchEntry| reg.requires(&entry.name);
        let filtered = Patch {
            added: self.added.iter().filter(keep).cloned().collect(),
            removed: self.removed.iter().filter(keep).cloned().collect(),
        };
        (!filtered.is_empty()).then_some(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GRADING_SERVICE, LOG_SERVICE};

    fn grading() -> Registration {
        Registration::for_address(
            GRADING_SERVICE,
            "http://h2:6000",
            vec![LOG_SERVICE.into()],
            "/services",
            "/heartbeat",
        )
    }

    #[test]
    fn test_go_shaped_patch_decodes() {
        let json = r#"{"Added":[{"Name":"LogService","URL":"http://h1:4000"}],"Removed":null}"#;
        let patch: Patch = serde_json::from_str(json).unwrap();

        assert_eq!(patch.added, vec![PatchEntry::new(LOG_SERVICE, "http://h1:4000")]);
        assert!(patch.removed.is_empty());
    }

    #[test]
    fn test_filter_keeps_required_entries_only() {
        let delta = Patch {
            added: vec![
                PatchEntry::new(LOG_SERVICE, "http://h1:4000"),
                PatchEntry::new("Other", "http://h3:7000"),
            ],
            removed: vec![PatchEntry::new(LOG_SERVICE, "http://h4:4000")],
        };

        let filtered = delta.filter_for(&grading()).unwrap();
        assert_eq!(filtered.added, vec![PatchEntry::new(LOG_SERVICE, "http://h1:4000")]);
        assert_eq!(filtered.removed, vec![PatchEntry::new(LOG_SERVICE, "http://h4:4000")]);
    }

    #[test]
    fn test_filter_unaffected_recipient() {
        let delta = Patch::added(vec![PatchEntry::new("Other", "http://h3:7000")]);
        assert!(delta.filter_for(&grading()).is_none());
    }
}
