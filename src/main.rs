//! 用户目录服务器

use anyhow::Context;
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use user_directory::{
    build_router,
    core::config::{ConfigSource, DEFAULT_CONFIG_PATH},
    infrastructure::{
        logger::Logger,
        store::{JsonFileStore, MemoryStore, UserStore},
    },
    Config,
};

#[derive(Debug, Parser)]
#[command(name = "directory_server", about = "用户目录 HTTP 服务")]
struct Args {
    /// 配置文件路径
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 使用内存存储（重启后数据丢失）
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (config, source) = Config::load(&args.config).context("加载配置失败")?;
    Logger::init(&config.logging.level);
    match source {
        ConfigSource::File => info!(path = %args.config.display(), "从配置文件加载"),
        ConfigSource::Defaults => {
            warn!(path = %args.config.display(), "未找到配置文件，使用默认配置")
        }
    }

    let store: Arc<dyn UserStore> = if args.memory {
        info!("使用内存存储");
        Arc::new(MemoryStore::new())
    } else {
        info!(path = %config.storage.data_file.display(), "使用 JSON 文件存储");
        Arc::new(JsonFileStore::new(&config.storage.data_file))
    };

    let app = build_router(&config, store);

    let address = config.listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("无法绑定到 {address}"))?;

    info!("🚀 用户目录服务运行在 http://{}", address);
    info!("📖 API 端点:");
    info!("   GET  {}?action=list    - 获取用户列表", config.http.api_path);
    info!("   POST {}?action=create  - 添加用户", config.http.api_path);
    info!("   POST {}?action=delete  - 按位置删除用户", config.http.api_path);
    info!("   GET  /health           - 健康检查");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("收到 Ctrl-C，正在关闭");
    }
}
