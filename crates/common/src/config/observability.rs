use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const FILTER_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 可观测性配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// EnvFilter 指令，如 "info,registry=debug"。环境变量 RUST_LOG 非空时优先。
    #[serde(default = "default_filter_level")]
    pub filter_level: String,

    #[serde(default)]
    pub log: LogConfig,
}

/// 本地日志写到哪里
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    /// `<path>/svcreg.log`，可按天轮转
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub output: LogOutput,

    /// 仅 output = "file" 时有效
    #[serde(default)]
    pub rotate: bool,

    /// 日志目录，仅 output = "file" 时有效
    #[serde(default = "default_log_dir")]
    pub path: PathBuf,

    /// 发现 LogService 后把日志以 `text/plain` POST 到 `<provider>/log`
    #[serde(default)]
    pub remote: bool,
}

fn default_filter_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs/")
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter_level: default_filter_level(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Console,
            rotate: false,
            path: default_log_dir(),
            remote: false,
        }
    }
}

impl ObservabilityConfig {
    /// 实际生效的过滤指令
    pub fn effective_filter(&self) -> String {
        match std::env::var("RUST_LOG") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => self.filter_level.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let main_level = self.filter_level.split(',').next().unwrap_or("").trim();
        if FILTER_LEVELS.contains(&main_level) {
            Ok(())
        } else {
            Err(format!(
                "Invalid filter level '{}', must start with one of: {}",
                self.filter_level,
                FILTER_LEVELS.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_parses_lowercase() {
        let log: LogConfig = toml::from_str("output = \"file\"\nrotate = true").unwrap();
        assert_eq!(log.output, LogOutput::File);
        assert!(log.rotate);
        assert!(toml::from_str::<LogConfig>("output = \"syslog\"").is_err());
    }

    #[test]
    fn test_filter_level_validation() {
        let mut config = ObservabilityConfig::default();
        assert!(config.validate().is_ok());

        config.filter_level = "debug,hyper=warn".to_string();
        assert!(config.validate().is_ok());

        config.filter_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
