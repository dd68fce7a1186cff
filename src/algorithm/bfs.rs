//! 广度优先搜索
//!
//! 在残余容量为正的边上寻找一条边数最少的源点到汇点路径，并记录每次发现

use super::step::{ParentMap, Step, StepTrace};
use super::{reconstruct_path, TraversalResult};
use crate::graph::{Edge, NodeId};
use std::collections::{BTreeSet, VecDeque};

/// BFS 查找路径
///
/// 候选边严格按边表顺序检查；发现汇点后立即结束，不再展开剩余队列
pub fn bfs(edges: &[Edge], source: NodeId, sink: NodeId) -> TraversalResult {
    let mut steps = StepTrace::new();
    let mut visited = BTreeSet::new();
    let mut parent = ParentMap::new();
    let mut queue = VecDeque::new();

    visited.insert(source);
    queue.push_back(source);
    steps.push(Step::visit(source, Some(&queue), &visited, &parent));

    while let Some(u) = queue.pop_front() {
        for edge in edges.iter().filter(|e| e.from() == u && e.has_residual()) {
            let v = edge.to();
            if visited.contains(&v) {
                continue;
            }

            steps.push(Step::EdgeProbe { from: u, to: v });

            visited.insert(v);
            queue.push_back(v);
            parent.insert(v, u);
            steps.push(Step::visit(v, Some(&queue), &visited, &parent));

            if v == sink {
                let path = reconstruct_path(&parent, source, sink);
                steps.push(Step::PathFound { path: path.clone() });
                return TraversalResult {
                    path,
                    steps,
                    parent,
                };
            }
        }
    }

    TraversalResult {
        path: Vec::new(),
        steps,
        parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FlowNetwork;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    #[test]
    fn test_bfs_demo_path() {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = bfs(&edges, n(0), n(4));

        assert_eq!(result.path, vec![n(0), n(1), n(2), n(4)]);
        assert_eq!(
            result.steps.last(),
            Some(&Step::PathFound {
                path: vec![n(0), n(1), n(2), n(4)]
            })
        );
        assert_eq!(result.parent.get(&n(4)), Some(&n(2)));
    }

    #[test]
    fn test_bfs_trace_order() {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = bfs(&edges, n(0), n(4));
        let kinds: Vec<&str> = result.steps.iter().map(Step::kind).collect();

        // 源点访问 + 5 次 (探边, 访问) + 路径
        assert_eq!(
            kinds,
            vec![
                "visit",
                "edgeProbe",
                "visit",
                "edgeProbe",
                "visit",
                "edgeProbe",
                "visit",
                "edgeProbe",
                "visit",
                "edgeProbe",
                "visit",
                "pathFound",
            ]
        );
        assert_eq!(
            result.steps.visit_order(),
            vec![n(0), n(1), n(5), n(2), n(3), n(4)]
        );

        // 每个探边步骤紧接着对应终点的访问步骤
        for pair in result.steps.as_slice().windows(2) {
            if let Step::EdgeProbe { to, .. } = &pair[0] {
                match &pair[1] {
                    Step::Visit { node, .. } => assert_eq!(node, to),
                    other => panic!("probe followed by {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_bfs_queue_snapshots() {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = bfs(&edges, n(0), n(4));

        match result.steps.get(0) {
            Some(Step::Visit { node, queue, .. }) => {
                assert_eq!(*node, n(0));
                assert_eq!(queue.as_deref(), Some(&[n(0)][..]));
            }
            other => panic!("unexpected first step {:?}", other),
        }

        // 访问 F(5) 时 0 已出队，队列为 [1, 5]
        match result.steps.get(4) {
            Some(Step::Visit {
                node,
                queue,
                visited,
                parent,
            }) => {
                assert_eq!(*node, n(5));
                assert_eq!(queue.as_deref(), Some(&[n(1), n(5)][..]));
                assert_eq!(visited, &vec![n(0), n(1), n(5)]);
                assert_eq!(parent.len(), 2);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_bfs_skips_saturated_edges() {
        let mut edges = FlowNetwork::demo().edge_snapshot();
        // 饱和 1->2，最短路径改走 1->3->4
        edges[2].set_flow(12).unwrap();

        let result = bfs(&edges, n(0), n(4));
        assert_eq!(result.path, vec![n(0), n(1), n(3), n(4)]);
    }

    #[test]
    fn test_bfs_unreachable_sink() {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = bfs(&edges, n(4), n(0));

        assert!(result.path.is_empty());
        assert_eq!(result.steps.len(), 1);
        assert!(result
            .steps
            .iter()
            .all(|s| !matches!(s, Step::PathFound { .. })));
    }

    #[test]
    fn test_bfs_missing_nodes_do_not_fault() {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = bfs(&edges, n(0), n(99));
        assert!(result.path.is_empty());
        assert_eq!(result.steps.visit_order().len(), 6);

        let result = bfs(&edges, n(77), n(4));
        assert!(result.path.is_empty());
    }
}
