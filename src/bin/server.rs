//! flowtrace 服务器入口
//!
//! 启动 HTTP API 服务器，供外部渲染器编辑网络并获取步骤序列

use anyhow::Context;
use clap::Parser;
use flowtrace::algorithm::Algorithm;
use flowtrace::config::{ServerConfig, SessionConfig, DEFAULT_TICK_MS};
use flowtrace::graph::FlowNetwork;
use flowtrace::import::load_document;
use flowtrace::server::start_server;
use flowtrace::session::Session;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowtrace-server")]
#[command(about = "flowtrace HTTP API 服务器")]
struct Args {
    /// 初始图文档（JSON），缺省使用六节点示例网络
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 监听地址
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// 监听端口
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// 初始算法
    #[arg(short, long, default_value = "bfs")]
    algorithm: Algorithm,

    /// 回放间隔（毫秒）
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let session_config = SessionConfig {
        algorithm: args.algorithm,
        tick_ms: args.tick_ms,
        ..SessionConfig::default()
    };
    session_config.tick()?;

    // 指定文档时从空网络开始，源汇取文档中的选择或首尾节点
    let initial = match args.input {
        Some(_) => FlowNetwork::new(),
        None => FlowNetwork::demo(),
    };
    let session = Session::new(initial, session_config);
    if let Some(path) = &args.input {
        let document = load_document(path)
            .with_context(|| format!("读取图文档失败: {}", path.display()))?;
        session.import(document)?;
    }
    let network = session.network();
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        source = %network.source(),
        sink = %network.sink(),
        "网络已加载"
    );

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };

    start_server(config, session).await?;

    Ok(())
}
