//! 命令行界面定义
//!
//! 定义了主程序的命令行参数和子命令
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "svcreg")]
#[command(version)]
#[command(about = "Service registry with heartbeat eviction, a central log service and the client runtime")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Configuration file path (defaults to searching standard locations)
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub(crate) config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run the registry server (/services)
    Registry,

    /// Run the log service and register it as LogService
    Logservice,

    /// Run a service instance that registers itself and tracks its required services
    Service {
        /// Service name to register (defaults to the configured instance name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Test configuration file
    Test {
        /// Configuration file path (optional, defaults to config.toml)
        #[arg(index = 1)]
        config_file: Option<PathBuf>,
    },
}
