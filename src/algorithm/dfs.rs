//! 深度优先搜索
//!
//! 用显式栈代替递归；发现顺序与步骤内容和递归写法完全一致：
//! 进入节点时先记录访问，再按边表顺序尝试出边，到达汇点立即返回

use super::step::{ParentMap, Step, StepTrace};
use super::{reconstruct_path, TraversalResult};
use crate::graph::{Edge, NodeId};
use std::collections::BTreeSet;

/// DFS 查找路径
///
/// 找到的是任意一条增广路径，不保证最短。汇点本身不产生访问步骤
pub fn dfs(edges: &[Edge], source: NodeId, sink: NodeId) -> TraversalResult {
    let mut steps = StepTrace::new();
    let mut visited = BTreeSet::new();
    let mut parent = ParentMap::new();

    let found =
        source == sink || explore(edges, source, sink, &mut visited, &mut parent, &mut steps);

    if !found {
        return TraversalResult {
            path: Vec::new(),
            steps,
            parent,
        };
    }

    let path = reconstruct_path(&parent, source, sink);
    steps.push(Step::PathFound { path: path.clone() });
    TraversalResult {
        path,
        steps,
        parent,
    }
}

/// 从 `start` 开始深度优先展开，到达汇点返回 true
fn explore(
    edges: &[Edge],
    start: NodeId,
    sink: NodeId,
    visited: &mut BTreeSet<NodeId>,
    parent: &mut ParentMap,
    steps: &mut StepTrace,
) -> bool {
    // 栈帧：(节点, 下一条待检查边在边表中的位置)
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    visited.insert(start);
    steps.push(Step::visit(start, None, visited, parent));
    stack.push((start, 0));

    while let Some(&(u, cursor)) = stack.last() {
        let next = edges[cursor..]
            .iter()
            .position(|e| e.from() == u && e.has_residual() && !visited.contains(&e.to()))
            .map(|offset| cursor + offset);

        let Some(index) = next else {
            stack.pop();
            continue;
        };

        if let Some(frame) = stack.last_mut() {
            frame.1 = index + 1;
        }

        let v = edges[index].to();
        steps.push(Step::EdgeProbe { from: u, to: v });
        parent.insert(v, u);

        if v == sink {
            return true;
        }

        visited.insert(v);
        steps.push(Step::visit(v, None, visited, parent));
        stack.push((v, 0));
    }

    false
}
