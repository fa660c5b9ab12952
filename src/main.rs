use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use baidu_share_transfer::{config::Config, AppState, ShareReference, TransferOptions};

/// 百度网盘分享链接转存工具
#[derive(Parser)]
#[command(name = "baidu-share-transfer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 分享链接或分享码，如 https://pan.baidu.com/s/1xxxx?pwd=abcd
    link: String,

    /// 提取码（链接里带 pwd= 时可省略）
    #[arg(long)]
    pwd: Option<String>,

    /// 转存目标目录，默认使用配置里的 save_path
    #[arg(long, short = 't')]
    path: Option<String>,

    /// 配置文件路径
    #[arg(long, env = "CONFIG_PATH", default_value = "config.toml")]
    config: String,

    /// 转存前先查询一次分享项
    #[arg(long)]
    query_first: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "baidu_share_transfer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("🚀 百度网盘转存工具启动中...");

    let config = Config::load(&cli.config)?;
    if std::path::Path::new(&cli.config).exists() {
        tracing::info!("✅ 配置加载完成: {}", cli.config);
    } else {
        tracing::info!("✅ 配置从环境变量加载");
    }

    let state = AppState::new(config)?;
    let client = state.share_client()?;
    tracing::info!("✅ HTTP Client 初始化完成");

    let share = ShareReference::parse(&cli.link, cli.pwd)
        .ok_or_else(|| anyhow!("无法从链接中提取分享码: {}", cli.link))?;

    let mut options =
        TransferOptions::new(cli.path.unwrap_or_else(|| state.config.baidu.save_path.clone()));
    options.query_first = cli.query_first;

    let receipt = client
        .transfer(&share, &options)
        .await
        .map_err(|e| anyhow!("转存失败: {}", e))?;

    tracing::info!(
        "✅ 已转存 {} 个文件 ({}) 到 {}",
        receipt.file_count,
        receipt.filename,
        receipt.save_path
    );
    Ok(())
}
