//! 最大流算法
//!
//! Ford-Fulkerson：反复在残余视图上查找增广路径并沿正向边提交瓶颈流量。
//! Edmonds-Karp 就是路径查找固定为 BFS 的 Ford-Fulkerson。
//!
//! 只在边表中已有的边上增广，不合成反向残余边；只有图中显式建模了反向边时，
//! 后续路径才可能经过它。因此最后一次失败搜索的可达集只是饱和前沿，
//! 不一定是最小割，需用 [`MaxFlow::is_min_cut`] 判断

use super::step::{Step, StepTrace};
use super::PathStrategy;
use crate::graph::{Edge, NodeId};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// 最大流结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxFlow {
    /// 最大流量值（本次运行累计增广量）
    pub value: u64,
    /// 所有轮次的遍历步骤、流量更新与总量步骤
    pub steps: StepTrace,
    /// 运行结束时的残余副本（含最终流量）
    pub edges: Vec<Edge>,
    /// 成功增广的轮数
    pub rounds: usize,
    /// 最后一次失败搜索能到达的节点（饱和前沿的源侧）
    pub source_side: BTreeSet<NodeId>,
}

impl MaxFlow {
    /// 流量等于容量的边
    pub fn saturated_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| !e.has_residual()).collect()
    }

    /// 饱和前沿：从源侧指向源侧之外的边
    pub fn frontier_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| self.source_side.contains(&e.from()) && !self.source_side.contains(&e.to()))
            .collect()
    }

    /// 饱和前沿的容量之和
    pub fn frontier_capacity(&self) -> u64 {
        self.frontier_edges().iter().map(|e| e.capacity()).sum()
    }

    /// 前沿是否构成最小割
    ///
    /// 前沿边全部饱和且没有流量从源侧之外流回源侧时，割容量等于流值。
    /// 没有反向残余边时，被占用的回流边无法撤销，前沿可能大于最小割
    pub fn is_min_cut(&self) -> bool {
        if self.source_side.is_empty() {
            return false;
        }
        self.edges.iter().all(|e| {
            let from_inside = self.source_side.contains(&e.from());
            let to_inside = self.source_side.contains(&e.to());
            match (from_inside, to_inside) {
                (true, false) => !e.has_residual(),
                (false, true) => e.flow() == 0,
                _ => true,
            }
        })
    }
}

/// Ford-Fulkerson 最大流，路径查找策略由调用方显式传入
#[derive(Debug, Clone, Copy)]
pub struct FordFulkerson {
    strategy: PathStrategy,
}

impl FordFulkerson {
    /// 创建算法实例
    pub fn new(strategy: PathStrategy) -> Self {
        Self { strategy }
    }

    /// Edmonds-Karp：固定使用 BFS
    pub fn edmonds_karp() -> Self {
        Self::new(PathStrategy::Bfs)
    }

    /// 路径查找策略
    pub fn strategy(&self) -> PathStrategy {
        self.strategy
    }

    /// 计算从 source 到 sink 的最大流
    ///
    /// 残余副本从调用方当前流量开始（不强制清零），调用方的边表不会被修改
    pub fn run(&self, edges: &[Edge], source: NodeId, sink: NodeId) -> MaxFlow {
        let mut residual = edges.to_vec();
        let mut steps = StepTrace::new();
        let mut total = 0u64;
        let mut rounds = 0usize;

        let source_side = loop {
            let found = self.strategy.find_path(&residual, source, sink);
            let path = found.path;
            steps.append(found.steps);

            if path.len() < 2 {
                let mut reached: BTreeSet<NodeId> = found.parent.into_keys().collect();
                reached.insert(source);
                break reached;
            }

            // 按 (from, to) 在残余副本中定位路径上的每条边
            let Some(indices) = path
                .windows(2)
                .map(|pair| residual.iter().position(|e| e.connects(pair[0], pair[1])))
                .collect::<Option<Vec<usize>>>()
            else {
                warn!(?path, "增广路径上的边不在边表中");
                break BTreeSet::new();
            };

            let bottleneck = indices
                .iter()
                .map(|&i| residual[i].residual())
                .min()
                .unwrap_or(0);
            if bottleneck == 0 {
                break BTreeSet::new();
            }

            for &i in &indices {
                let edge = &mut residual[i];
                let flow = match edge.augment(bottleneck) {
                    Ok(flow) => flow,
                    Err(e) => {
                        warn!(error = %e, "增广失败");
                        edge.flow()
                    }
                };
                steps.push(Step::FlowUpdate {
                    from: edge.from(),
                    to: edge.to(),
                    flow,
                    path_flow: bottleneck,
                });
            }

            total += bottleneck;
            rounds += 1;
            steps.push(Step::FlowTotal { value: total });
            debug!(round = rounds, ?path, bottleneck, total, "增广");
        };

        info!(
            strategy = ?self.strategy,
            %source,
            %sink,
            value = total,
            rounds,
            steps = steps.len(),
            "最大流计算完成"
        );

        MaxFlow {
            value: total,
            steps,
            edges: residual,
            rounds,
            source_side,
        }
    }
}

/// 计算最大流（便捷函数）
pub fn max_flow(edges: &[Edge], source: NodeId, sink: NodeId, strategy: PathStrategy) -> MaxFlow {
    FordFulkerson::new(strategy).run(edges, source, sink)
}
