use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 日志服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogServiceConfig {
    /// 日志落盘文件
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("./distributed.log")
}

impl Default for LogServiceConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}
