//! flowtrace 命令行工具
//!
//! 加载网络、运行算法、打印或按节拍回放步骤序列

use anyhow::Context;
use clap::Parser;
use flowtrace::algorithm::{Algorithm, PathStrategy, RunOutcome};
use flowtrace::cli::Printer;
use flowtrace::config::{SessionConfig, DEFAULT_TICK_MS};
use flowtrace::graph::{FlowNetwork, NodeId};
use flowtrace::import::{load_document, save_document};
use flowtrace::player::PlaybackEnd;
use flowtrace::session::Session;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowtrace-cli")]
#[command(about = "图遍历与最大流算法步骤演示")]
struct Args {
    /// 图文档（JSON），缺省使用六节点示例网络
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 算法：bfs, dfs, fordFulkerson, edmondsKarp
    #[arg(short, long, default_value = "bfs")]
    algorithm: Algorithm,

    /// Ford-Fulkerson 的路径查找策略：bfs, dfs
    #[arg(long, default_value = "dfs")]
    search: PathStrategy,

    /// 源点 ID
    #[arg(short, long)]
    source: Option<u64>,

    /// 汇点 ID
    #[arg(short = 't', long)]
    sink: Option<u64>,

    /// 按节拍回放步骤
    #[arg(short, long)]
    replay: bool,

    /// 回放间隔（毫秒）
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// 最大流从文档中的现有流量继续
    #[arg(long)]
    resume: bool,

    /// 不打印步骤，只输出摘要
    #[arg(short, long)]
    quiet: bool,

    /// 将运行后的网络导出到文件
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let config = SessionConfig {
        algorithm: args.algorithm,
        search: args.search,
        tick_ms: args.tick_ms,
        resume_flows: args.resume,
    };
    let tick = config.tick()?;

    // 指定文档时从空网络开始，源汇取文档中的选择或首尾节点
    let initial = match args.input {
        Some(_) => FlowNetwork::new(),
        None => FlowNetwork::demo(),
    };
    let session = Session::new(initial, config);
    if let Some(path) = &args.input {
        let document = load_document(path)
            .with_context(|| format!("读取图文档失败: {}", path.display()))?;
        // 从已有流量继续时保留文档中的流量
        let stats = session.import_with(document, args.resume)?;
        println!(
            "已加载 {}: {} 个节点, {} 条边",
            path.display(),
            stats.nodes_imported,
            stats.edges_imported
        );
    }
    let outcome = session.run_with(
        None,
        args.source.map(NodeId::new),
        args.sink.map(NodeId::new),
    )?;

    let network = session.network();
    let printer = Printer::new(&network);
    println!("算法: {}", args.algorithm);

    if args.replay {
        let mut player = session.player().context("没有可回放的步骤")?;
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = stop_tx.send(true);
            }
        });

        let mut index = 0;
        let end = player
            .play(tick, stop_rx, |step, _| {
                if !args.quiet {
                    println!("{}", printer.format_step(index, step));
                }
                index += 1;
            })
            .await;
        if let PlaybackEnd::Stopped { applied } = end {
            println!("回放已中断: {}/{}", applied, player.trace().len());
        }
    } else if !args.quiet {
        for (index, step) in outcome.steps().iter().enumerate() {
            println!("{}", printer.format_step(index, step));
        }
    }

    println!("{}", printer.summary(&network, &outcome));

    if let RunOutcome::MaxFlow(_) = outcome {
        session.apply_trace()?;
        println!("{}", printer.edge_table(&session.network()));
    }

    if let Some(path) = &args.output {
        save_document(path, &session.export())
            .with_context(|| format!("导出失败: {}", path.display()))?;
        println!("已导出到 {}", path.display());
    }

    Ok(())
}
