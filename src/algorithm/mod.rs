//! 图算法模块
//!
//! 包含 BFS/DFS 路径查找和 Ford-Fulkerson / Edmonds-Karp 最大流，
//! 每个入口都返回完整的步骤序列供外部回放

mod bfs;
mod dfs;
mod max_flow;
mod step;

pub use bfs::bfs;
pub use dfs::dfs;
pub use max_flow::{max_flow, FordFulkerson, MaxFlow};
pub use step::{ParentMap, Step, StepTrace};

use crate::error::Error;
use crate::graph::{Edge, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 遍历结果
#[derive(Debug, Clone, Serialize)]
pub struct TraversalResult {
    /// 源点到汇点的路径（含两端），未找到时为空
    pub path: Vec<NodeId>,
    /// 遍历步骤
    pub steps: StepTrace,
    /// 父节点映射
    pub parent: ParentMap,
}

/// 增广路径查找策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStrategy {
    /// 广度优先（最短增广路径）
    Bfs,
    /// 深度优先（任意增广路径）
    Dfs,
}

impl PathStrategy {
    /// 在给定边表上查找一条路径
    pub fn find_path(self, edges: &[Edge], source: NodeId, sink: NodeId) -> TraversalResult {
        match self {
            PathStrategy::Bfs => bfs(edges, source, sink),
            PathStrategy::Dfs => dfs(edges, source, sink),
        }
    }
}

impl FromStr for PathStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bfs" => Ok(PathStrategy::Bfs),
            "dfs" => Ok(PathStrategy::Dfs),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// 可选算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    Bfs,
    Dfs,
    FordFulkerson,
    EdmondsKarp,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::FordFulkerson,
        Algorithm::EdmondsKarp,
    ];

    /// 是否为最大流算法
    pub fn is_max_flow(&self) -> bool {
        matches!(self, Algorithm::FordFulkerson | Algorithm::EdmondsKarp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::FordFulkerson => "fordFulkerson",
            Algorithm::EdmondsKarp => "edmondsKarp",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "fordfulkerson" | "ff" => Ok(Algorithm::FordFulkerson),
            "edmondskarp" | "ek" => Ok(Algorithm::EdmondsKarp),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// 一次算法运行的结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RunOutcome {
    /// BFS / DFS：路径、步骤、父节点映射
    Traversal(TraversalResult),
    /// Ford-Fulkerson / Edmonds-Karp：最大流与步骤
    MaxFlow(MaxFlow),
}

impl RunOutcome {
    /// 步骤序列
    pub fn steps(&self) -> &StepTrace {
        match self {
            RunOutcome::Traversal(result) => &result.steps,
            RunOutcome::MaxFlow(result) => &result.steps,
        }
    }

    /// 遍历模式找到的路径
    pub fn path(&self) -> Option<&[NodeId]> {
        match self {
            RunOutcome::Traversal(result) => Some(result.path.as_slice()),
            RunOutcome::MaxFlow(_) => None,
        }
    }

    /// 最大流模式的最终流量
    pub fn max_flow(&self) -> Option<u64> {
        match self {
            RunOutcome::Traversal(_) => None,
            RunOutcome::MaxFlow(result) => Some(result.value),
        }
    }
}

/// 按算法分派
///
/// `search` 只对 Ford-Fulkerson 生效；Edmonds-Karp 始终使用 BFS
pub fn run_algorithm(
    algorithm: Algorithm,
    edges: &[Edge],
    source: NodeId,
    sink: NodeId,
    search: PathStrategy,
) -> RunOutcome {
    match algorithm {
        Algorithm::Bfs => RunOutcome::Traversal(bfs(edges, source, sink)),
        Algorithm::Dfs => RunOutcome::Traversal(dfs(edges, source, sink)),
        Algorithm::FordFulkerson => {
            RunOutcome::MaxFlow(FordFulkerson::new(search).run(edges, source, sink))
        }
        Algorithm::EdmondsKarp => {
            RunOutcome::MaxFlow(FordFulkerson::edmonds_karp().run(edges, source, sink))
        }
    }
}

/// 沿父指针从汇点回溯到源点并反转
pub(crate) fn reconstruct_path(parent: &ParentMap, source: NodeId, sink: NodeId) -> Vec<NodeId> {
    let mut path = vec![sink];
    let mut current = sink;

    while current != source {
        match parent.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }

    path.reverse();
    path
}
