//! 远程日志写入器
//!
//! 作为 `tracing_subscriber::fmt` 的 writer 使用：每个事件格式化后入队，
//! 由 [`RemoteLogShipper`] 在后台 POST 到 `<endpoint>/log`。
//! 投递失败只打印到 stderr，不能再经过 tracing。

use std::io;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{LogSinkError, Result};

const QUEUE_CAPACITY: usize = 1024;

/// 远程日志 writer 工厂
#[derive(Debug, Clone)]
pub struct RemoteLogWriter {
    prefix: Arc<str>,
    endpoint: Arc<RwLock<Option<String>>>,
    tx: mpsc::Sender<(String, String)>,
}

impl RemoteLogWriter {
    /// 创建 writer 与对应的后台投递任务
    ///
    /// 每行日志以 `[<service_name>] - ` 开头。
    pub fn new(service_name: &str, timeout: Duration) -> Result<(Self, RemoteLogShipper)> {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let writer = Self {
            prefix: Arc::from(format!("[{service_name}] - ")),
            endpoint: Arc::new(RwLock::new(None)),
            tx,
        };
        Ok((writer, RemoteLogShipper { http, rx }))
    }

    /// 设置日志服务地址；未设置前写入的日志会被丢弃
    pub fn set_endpoint(&self, base_url: &str) {
        if let Ok(mut endpoint) = self.endpoint.write() {
            *endpoint = Some(format!("{}/log", base_url.trim_end_matches('/')));
        }
    }

    pub fn endpoint(&self) -> Option<String> {
        self.endpoint.read().ok().and_then(|e| e.clone())
    }

    fn enqueue(&self, line: String) {
        let Some(endpoint) = self.endpoint() else {
            return;
        };
        // 队列满时丢弃
        let _ = self.tx.try_send((endpoint, format!("{}{}", self.prefix, line)));
    }
}

impl<'a> MakeWriter<'a> for RemoteLogWriter {
    type Writer = RemoteLine;

    fn make_writer(&'a self) -> Self::Writer {
        RemoteLine {
            writer: self.clone(),
            buffer: Vec::new(),
        }
    }
}

/// 单个事件的缓冲区，drop 时入队
pub struct RemoteLine {
    writer: RemoteLogWriter,
    buffer: Vec<u8>,
}

impl io::Write for RemoteLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RemoteLine {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.writer.enqueue(line);
    }
}

/// 后台投递任务
pub struct RemoteLogShipper {
    http: reqwest::Client,
    rx: mpsc::Receiver<(String, String)>,
}

impl RemoteLogShipper {
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = self.rx.recv() => {
                    let Some((endpoint, line)) = next else { break };
                    if let Err(e) = self.ship(&endpoint, line).await {
                        eprintln!("remote log delivery to {endpoint} failed: {e}");
                    }
                }
            }
        }
    }

    async fn ship(&self, endpoint: &str, line: String) -> Result<()> {
        let response = self
            .http
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(line)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(LogSinkError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
