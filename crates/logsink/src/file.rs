//! 日志文件写入

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;

/// 每条日志行的固定前缀
pub const LINE_PREFIX: &str = "svcreg: ";

/// 追加写入的日志文件
///
/// 每次写入都以 create + append 方式打开文件，外部轮转或删除文件后会自动重建。
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入一条消息，返回写入的字节数
    pub async fn write(&self, message: &str) -> Result<usize> {
        let line = format_line(message);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(line.len())
    }
}

fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S");
    let mut line = format!("{LINE_PREFIX}{timestamp} {message}");
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}
