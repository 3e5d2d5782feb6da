//! svcreg 主程序
//!
//! 同一个二进制按子命令扮演注册中心、日志服务或普通服务实例

mod cli;

use clap::Parser;
use logsink::{FileLog, RemoteLogWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use svcreg::observability::{ObservabilityGuard, init_observability};
use svcreg::{Error, RegistryServer, Result, ServiceHost, SvcregConfig};
use svcreg_common::LOG_SERVICE;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

// 订阅器初始化之前只能直接写终端
macro_rules! bootstrap_info {
    ($($arg:tt)*) => {
        println!($($arg)*);
    };
}

macro_rules! bootstrap_error {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

use cli::{Cli, Commands};

const DEFAULT_CONFIG: &str = "config.toml";
const SYSTEM_CONFIG: &str = "/etc/svcreg/config.toml";

enum Role {
    Registry,
    LogService,
    Service(Option<String>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            bootstrap_error!("❌ {e}");
            if e.is_config() {
                bootstrap_error!("   运行 `svcreg test <config>` 检查配置文件");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let role = match cli.command {
        Commands::Test { config_file } => {
            let path = locate_config(config_file.as_deref().unwrap_or(&cli.config))?;
            return check_config(&path);
        }
        Commands::Registry => Role::Registry,
        Commands::Logservice => Role::LogService,
        Commands::Service { name } => Role::Service(name),
    };

    let path = locate_config(&cli.config)?;
    let config = load_config(&path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_role(config, role))
}

/// 显式指定的路径必须存在；默认值时依次查找当前目录和系统目录
fn locate_config(requested: &Path) -> Result<PathBuf> {
    if requested != Path::new(DEFAULT_CONFIG) {
        if requested.is_file() {
            bootstrap_info!("Using provided config file: {}", requested.display());
            return Ok(requested.to_path_buf());
        }
        return Err(Error::ConfigNotFound {
            path: requested.display().to_string(),
        });
    }

    let candidates = [PathBuf::from(DEFAULT_CONFIG), PathBuf::from(SYSTEM_CONFIG)];
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        bootstrap_info!("Found config file: {}", found.display());
        return Ok(found.clone());
    }

    bootstrap_error!("No configuration file found. Looked in:");
    for path in &candidates {
        bootstrap_error!("  - {}", path.display());
    }
    bootstrap_error!("Create one there or pass --config <path>");
    Err(Error::ConfigNotFound {
        path: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// 把 validate() 的结果拆成 (警告, 错误)
fn split_findings(config: &SvcregConfig) -> (Vec<String>, Vec<String>) {
    match config.validate() {
        Ok(()) => (Vec::new(), Vec::new()),
        Err(findings) => findings
            .into_iter()
            .partition(|finding| finding.starts_with("Warning:")),
    }
}

/// `svcreg test`：只解析与校验，不启动任何服务
fn check_config(path: &Path) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = SvcregConfig::from_file(path).map_err(|e| {
        error!("❌ 配置文件解析失败: {}", e);
        Error::config_rejected(format!("配置解析失败: {e}"))
    })?;
    info!("✅ 配置文件解析成功: {}", path.display());

    let (warnings, errors) = split_findings(&config);
    for warning in &warnings {
        warn!("⚠️  {}", warning);
    }
    for err in &errors {
        error!("❌ {}", err);
    }
    if !errors.is_empty() {
        return Err(Error::config_rejected(format!(
            "配置验证失败 ({} 个错误)",
            errors.len()
        )));
    }

    info!("✅ 完整配置验证通过");
    Ok(())
}

fn load_config(path: &Path) -> Result<SvcregConfig> {
    bootstrap_info!("📄 加载配置文件: {}", path.display());
    let config = SvcregConfig::from_file(path)?;

    let (warnings, errors) = split_findings(&config);
    for warning in &warnings {
        bootstrap_info!("  ⚠️  {}", warning);
    }
    if !errors.is_empty() {
        for err in &errors {
            bootstrap_error!("  ❌ {}", err);
        }
        return Err(Error::config_rejected("配置验证失败，请修复上述错误"));
    }

    Ok(config)
}

async fn run_role(config: SvcregConfig, role: Role) -> Result<()> {
    let (shutdown_tx, _) = broadcast::channel::<()>(10);
    forward_ctrl_c(shutdown_tx.clone());

    match role {
        Role::Registry => {
            let _guard = init_observability(&config.observability, None)?;
            info!("🚀 启动注册中心 {}", config.name);

            let server = RegistryServer::start(&config, shutdown_tx).await?;
            info!("🔧 注册端点: {}", server.services_url());
            server.wait().await?;
        }
        Role::LogService => {
            let _guard = init_observability(&config.observability, None)?;
            info!("🚀 启动日志服务，写入 {}", config.log_service.file.display());

            let log = Arc::new(FileLog::new(config.log_service.file.clone()));
            let running = ServiceHost::bind(&config, LOG_SERVICE, shutdown_tx)
                .await?
                .serve(logsink::create_router(log))
                .await?;
            running.wait().await?;
        }
        Role::Service(name) => {
            let name = name.unwrap_or_else(|| config.name.clone());
            let (_guard, remote) = init_service_observability(&config, &name)?;
            info!("🚀 启动服务 {}", name);

            let mut host = ServiceHost::bind(&config, name.as_str(), shutdown_tx).await?;
            if let Some(writer) = remote {
                host = host.with_remote_log(writer);
            }
            let running = host.serve(axum::Router::new()).await?;
            info!("📡 {} 已注册: {}", name, running.registration().service_url);
            running.wait().await?;
        }
    }

    info!("🛑 服务已安全关闭");
    Ok(())
}

/// `observability.log.remote` 开启时额外挂载远程日志层
fn init_service_observability(
    config: &SvcregConfig,
    service_name: &str,
) -> Result<(ObservabilityGuard, Option<RemoteLogWriter>)> {
    if !config.observability.log.remote {
        return Ok((init_observability(&config.observability, None)?, None));
    }

    let (writer, shipper) = RemoteLogWriter::new(
        service_name,
        Duration::from_secs(config.registry.request_timeout_secs),
    )?;
    let guard = init_observability(&config.observability, Some(writer.clone()))?;
    // 进程退出前一直运行
    tokio::spawn(shipper.run(CancellationToken::new()));

    Ok((guard, Some(writer)))
}

fn forward_ctrl_c(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("无法监听Ctrl-C信号: {}", e);
            return;
        }
        info!("收到Ctrl-C信号，开始优雅关闭...");
        let _ = shutdown_tx.send(());
    });
}
