mod render;
mod session;

use anyhow::Context;
use hearts_demo_core::TableConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，避免和牌桌输出混在一起
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    session::run(config).await
}

/// 读取配置：命令行第一个参数或 `HEARTS_CONFIG` 指定的 JSON 文件，再叠加环境变量
fn load_config() -> anyhow::Result<TableConfig> {
    let path = std::env::args().nth(1).or_else(|| std::env::var("HEARTS_CONFIG").ok());

    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("无法读取配置文件 {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("配置文件 {} 格式错误", path))?
        }
        None => TableConfig::default(),
    };

    if let Ok(seed) = std::env::var("HEARTS_SEED") {
        config.seed = seed.parse().with_context(|| format!("HEARTS_SEED 不是有效的整数: {}", seed))?;
    }
    if let Ok(kind) = std::env::var("HEARTS_STRATEGY") {
        config.strategy = kind.parse().map_err(anyhow::Error::msg)?;
    }

    Ok(config)
}
