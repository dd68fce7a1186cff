//! 会话
//!
//! 持有可编辑网络、源汇选择、算法选择和最近一次运行结果。
//! 运行与编辑互斥：任一操作持有运行锁时另一方立即失败，不排队

use crate::algorithm::{run_algorithm, Algorithm, RunOutcome};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::graph::{FlowNetwork, NodeId};
use crate::import::{GraphDocument, ImportStats};
use crate::player::Player;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// 应用会话
pub struct Session {
    network: RwLock<FlowNetwork>,
    config: RwLock<SessionConfig>,
    outcome: RwLock<Option<RunOutcome>>,
    running: Mutex<()>,
}

impl Session {
    /// 创建会话
    pub fn new(network: FlowNetwork, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            network: RwLock::new(network),
            config: RwLock::new(config),
            outcome: RwLock::new(None),
            running: Mutex::new(()),
        })
    }

    /// 以示例网络和默认配置创建会话
    pub fn demo() -> Arc<Self> {
        Self::new(FlowNetwork::demo(), SessionConfig::default())
    }

    /// 网络快照
    pub fn network(&self) -> FlowNetwork {
        self.network.read().clone()
    }

    pub fn config(&self) -> SessionConfig {
        *self.config.read()
    }

    /// 替换配置
    pub fn set_config(&self, config: SessionConfig) -> Result<()> {
        config.tick()?;
        *self.config.write() = config;
        Ok(())
    }

    /// 选择算法
    pub fn set_algorithm(&self, algorithm: Algorithm) {
        self.config.write().algorithm = algorithm;
    }

    /// 修改网络；清除上一次运行结果
    pub fn edit<R>(&self, f: impl FnOnce(&mut FlowNetwork) -> Result<R>) -> Result<R> {
        let _guard = self.acquire()?;
        let mut network = self.network.write();
        let result = f(&mut network)?;
        *self.outcome.write() = None;
        Ok(result)
    }

    /// 选择源点与汇点（未给出的保持不变）
    pub fn select(&self, source: Option<NodeId>, sink: Option<NodeId>) -> Result<()> {
        self.edit(|network| {
            if let Some(source) = source {
                network.set_source(source)?;
            }
            if let Some(sink) = sink {
                network.set_sink(sink)?;
            }
            Ok(())
        })
    }

    /// 运行当前算法
    ///
    /// 依次检查：节点不足、没有边、源点等于汇点。
    /// 默认先清零流量并丢弃上一次的步骤序列，算法在边表快照上运行
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_with(None, None, None)
    }

    /// 以给定的算法与源汇运行，未给出的取会话当前值
    ///
    /// 全部检查通过后才写入新的算法与源汇选择；被拒绝的请求不改变会话，
    /// 上一次运行结果也保留
    pub fn run_with(
        &self,
        algorithm: Option<Algorithm>,
        source: Option<NodeId>,
        sink: Option<NodeId>,
    ) -> Result<RunOutcome> {
        let _guard = self.acquire()?;
        let mut config = self.config();
        if let Some(algorithm) = algorithm {
            config.algorithm = algorithm;
        }

        let (edges, source, sink) = {
            let mut network = self.network.write();
            for id in source.iter().chain(sink.iter()) {
                if !network.contains_node(*id) {
                    return Err(Error::NodeNotFound(id.as_u64()));
                }
            }
            let source = source.unwrap_or_else(|| network.source());
            let sink = sink.unwrap_or_else(|| network.sink());
            Self::check_runnable(&network, source, sink)?;

            network.set_source(source)?;
            network.set_sink(sink)?;
            if !(config.resume_flows && config.algorithm.is_max_flow()) {
                network.reset_flows();
            }
            (network.edge_snapshot(), source, sink)
        };
        self.config.write().algorithm = config.algorithm;
        *self.outcome.write() = None;

        let start = Instant::now();
        let outcome = run_algorithm(config.algorithm, &edges, source, sink, config.search);
        info!(
            algorithm = %config.algorithm,
            %source,
            %sink,
            steps = outcome.steps().len(),
            max_flow = ?outcome.max_flow(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "算法运行完成"
        );

        *self.outcome.write() = Some(outcome.clone());
        Ok(outcome)
    }

    /// 最近一次运行结果
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome.read().clone()
    }

    /// 清除步骤序列并将所有流量归零
    pub fn reset(&self) -> Result<()> {
        let _guard = self.acquire()?;
        self.network.write().reset_flows();
        *self.outcome.write() = None;
        debug!("会话已重置");
        Ok(())
    }

    /// 把最近一次最大流运行的最终流量提交到网络
    ///
    /// 返回提交的最大流；最近一次不是最大流运行时返回 None
    pub fn apply_trace(&self) -> Result<Option<u64>> {
        let _guard = self.acquire()?;
        let (edges, value) = match self.outcome.read().as_ref() {
            Some(RunOutcome::MaxFlow(result)) => (result.edges.clone(), result.value),
            _ => return Ok(None),
        };
        self.network.write().apply_flows(&edges)?;
        info!(value, "最大流已提交到网络");
        Ok(Some(value))
    }

    /// 为最近一次运行创建播放器，初始流量取网络当前值
    pub fn player(&self) -> Option<Player> {
        let edges = self.network.read().edge_snapshot();
        let outcome = self.outcome.read();
        Some(Player::new(outcome.as_ref()?.steps().clone(), edges))
    }

    /// 导入图文档，替换当前网络；文档中的流量清零
    pub fn import(&self, document: GraphDocument) -> Result<ImportStats> {
        self.import_with(document, false)
    }

    /// 导入图文档，替换当前网络
    ///
    /// `keep_flows` 为真时保留文档中的流量。文档没有源汇选择时，
    /// 原源点与汇点在新网络中都存在则保持不变，否则取第一个和最后一个节点
    pub fn import_with(&self, document: GraphDocument, keep_flows: bool) -> Result<ImportStats> {
        let keep_selection = !document.has_selection();
        let (mut network, stats) = document.into_network_with(keep_flows)?;
        self.edit(|current| {
            let (source, sink) = (current.source(), current.sink());
            if keep_selection
                && source != sink
                && network.contains_node(source)
                && network.contains_node(sink)
            {
                network.set_source(source)?;
                network.set_sink(sink)?;
            }
            *current = network;
            Ok(())
        })?;
        info!(
            nodes = stats.nodes_imported,
            edges = stats.edges_imported,
            flows_reset = stats.flows_reset,
            "图已导入"
        );
        Ok(stats)
    }

    /// 导出当前网络
    pub fn export(&self) -> GraphDocument {
        GraphDocument::from_network(&self.network.read())
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        self.running.try_lock().ok_or(Error::RunInProgress)
    }

    fn check_runnable(network: &FlowNetwork, source: NodeId, sink: NodeId) -> Result<()> {
        if network.node_count() < 2 {
            return Err(Error::NotEnoughNodes);
        }
        if network.edge_count() == 0 {
            return Err(Error::NoEdges);
        }
        if source == sink {
            return Err(Error::SourceEqualsSink(source.as_u64()));
        }
        Ok(())
    }
}
