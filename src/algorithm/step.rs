//! 算法步骤记录
//!
//! 引擎在执行过程中产出的有序步骤序列，外部播放器按顺序逐步回放

use crate::graph::NodeId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// 父节点映射：子节点 -> 父节点
pub type ParentMap = BTreeMap<NodeId, NodeId>;

/// 单个步骤
///
/// 快照字段是发出时刻的拷贝，之后引擎内部状态的变化不会影响已记录的步骤
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    /// 新发现节点
    Visit {
        node: NodeId,
        /// BFS 队列快照（从队首到队尾）；DFS 没有队列
        #[serde(skip_serializing_if = "Option::is_none")]
        queue: Option<Vec<NodeId>>,
        /// 已访问节点（升序）
        visited: Vec<NodeId>,
        parent: ParentMap,
    },
    /// 检查一条候选边
    EdgeProbe { from: NodeId, to: NodeId },
    /// 找到从源点到汇点的路径（含两端）
    PathFound { path: Vec<NodeId> },
    /// 路径上一条边的流量更新
    FlowUpdate {
        from: NodeId,
        to: NodeId,
        /// 边上的新流量
        flow: u64,
        /// 本轮增广量
        #[serde(rename = "pathFlow")]
        path_flow: u64,
    },
    /// 本轮结束后的累计总流量
    FlowTotal { value: u64 },
}

impl Step {
    /// 构造带快照的访问步骤
    pub(crate) fn visit(
        node: NodeId,
        queue: Option<&VecDeque<NodeId>>,
        visited: &BTreeSet<NodeId>,
        parent: &ParentMap,
    ) -> Self {
        Step::Visit {
            node,
            queue: queue.map(|q| q.iter().copied().collect()),
            visited: visited.iter().copied().collect(),
            parent: parent.clone(),
        }
    }

    /// 步骤类型名（与序列化标签一致）
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Visit { .. } => "visit",
            Step::EdgeProbe { .. } => "edgeProbe",
            Step::PathFound { .. } => "pathFound",
            Step::FlowUpdate { .. } => "flowUpdate",
            Step::FlowTotal { .. } => "flowTotal",
        }
    }
}

/// 步骤序列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepTrace(Vec<Step>);

impl StepTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    /// 追加另一段序列（保持顺序）
    pub fn append(&mut self, other: StepTrace) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.0.get(index)
    }

    pub fn last(&self) -> Option<&Step> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.0
    }

    /// 所有找到的路径（按出现顺序）
    pub fn paths(&self) -> Vec<&[NodeId]> {
        self.0
            .iter()
            .filter_map(|step| match step {
                Step::PathFound { path } => Some(path.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// 按发现顺序列出被访问的节点
    pub fn visit_order(&self) -> Vec<NodeId> {
        self.0
            .iter()
            .filter_map(|step| match step {
                Step::Visit { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a StepTrace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Step>> for StepTrace {
    fn from(steps: Vec<Step>) -> Self {
        Self(steps)
    }
}
