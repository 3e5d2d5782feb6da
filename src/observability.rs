use logsink::RemoteLogWriter;
use std::fs;
use svcreg_common::config::{LogConfig, LogOutput, ObservabilityConfig};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::{EnvFilter, Targets},
    fmt,
    prelude::*,
};

use crate::error::Result;

const LOG_FILE_NAME: &str = "svcreg.log";

/// 持有文件日志的后台写线程，drop 时刷盘
#[derive(Default)]
pub struct ObservabilityGuard {
    log_guard: Option<WorkerGuard>,
}

impl ObservabilityGuard {
    pub fn has_file_writer(&self) -> bool {
        self.log_guard.is_some()
    }
}

/// 按配置初始化全局订阅器
///
/// `remote` 不为空时，额外挂载一个转发到日志服务的 fmt 层。
pub fn init_observability(
    config: &ObservabilityConfig,
    remote: Option<RemoteLogWriter>,
) -> Result<ObservabilityGuard> {
    let mut guard = ObservabilityGuard::default();

    match config.log.output {
        LogOutput::File => {
            fs::create_dir_all(&config.log.path)?;
            let (non_blocking, worker_guard) = build_file_writer(&config.log)?;
            guard.log_guard = Some(worker_guard);

            init_subscriber_with_writer(non_blocking, false, config, remote);
        }
        LogOutput::Console => {
            init_subscriber_with_writer(std::io::stdout, true, config, remote);
        }
    }

    Ok(guard)
}

/// RUST_LOG 优先，指令无法解析时退回 info
fn create_env_filter(config: &ObservabilityConfig) -> EnvFilter {
    let directive = config.effective_filter();
    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Invalid filter directive '{directive}' ({e}), falling back to info");
        EnvFilter::new("info")
    })
}

/// 远程日志只转发本程序自身的事件，HTTP 客户端内部的事件会形成回环
fn remote_filter() -> Targets {
    Targets::new()
        .with_default(LevelFilter::INFO)
        .with_target("hyper", LevelFilter::OFF)
        .with_target("hyper_util", LevelFilter::OFF)
        .with_target("reqwest", LevelFilter::OFF)
        .with_target("tower_http", LevelFilter::OFF)
}

fn init_subscriber_with_writer<W>(
    writer: W,
    use_ansi: bool,
    config: &ObservabilityConfig,
    remote: Option<RemoteLogWriter>,
) where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(use_ansi)
        .with_writer(writer);

    let remote_layer = remote.map(|writer| {
        fmt::layer()
            .without_time()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(remote_filter())
    });

    // EnvFilter 作用于全部层，远程层再叠加自己的 Targets
    tracing_subscriber::registry()
        .with(create_env_filter(config))
        .with(fmt_layer)
        .with(remote_layer)
        .try_init()
        .ok();
}

fn build_file_writer(log_config: &LogConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = &log_config.path;
    if log_config.rotate {
        println!("日志写入 {} (按天轮转)", dir.join(LOG_FILE_NAME).display());
        return Ok(tracing_appender::non_blocking(
            tracing_appender::rolling::daily(dir, LOG_FILE_NAME),
        ));
    }

    let path = dir.join(LOG_FILE_NAME);
    println!("日志写入 {}", path.display());
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_appender::non_blocking(file))
}
