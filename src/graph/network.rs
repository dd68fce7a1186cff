//! 流网络
//!
//! 节点与边按插入顺序保存；边表顺序决定遍历时的候选顺序，删除时必须保持剩余顺序

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use tracing::debug;

/// 可编辑的有向带容量网络
#[derive(Debug, Clone, Default)]
pub struct FlowNetwork {
    /// 节点（插入顺序）
    nodes: IndexMap<NodeId, Node>,
    /// 边（插入顺序即边表顺序）
    edges: IndexMap<EdgeId, Edge>,
    /// 源点
    source: NodeId,
    /// 汇点
    sink: NodeId,
}

impl FlowNetwork {
    /// 创建空网络
    pub fn new() -> Self {
        Self::default()
    }

    /// 经典六节点示例网络，源点 A(0)，汇点 E(4)
    pub fn demo() -> Self {
        let mut network = Self::new();
        let positions = [
            ("A", 100.0, 100.0),
            ("B", 250.0, 50.0),
            ("C", 400.0, 100.0),
            ("D", 250.0, 200.0),
            ("E", 300.0, 300.0),
            ("F", 150.0, 300.0),
        ];
        for (i, (label, x, y)) in positions.iter().enumerate() {
            let id = NodeId::new(i as u64);
            network.nodes.insert(id, Node::new(id, *label, *x, *y));
        }

        let edges = [
            (0, 1, 16),
            (0, 5, 13),
            (1, 2, 12),
            (1, 3, 10),
            (2, 4, 20),
            (3, 2, 9),
            (3, 4, 14),
            (5, 3, 4),
        ];
        for (i, &(from, to, capacity)) in edges.iter().enumerate() {
            let id = EdgeId::new(i as u64);
            if let Ok(edge) = Edge::new(id, NodeId::new(from), NodeId::new(to), capacity) {
                network.edges.insert(id, edge);
            }
        }

        network.source = NodeId::new(0);
        network.sink = NodeId::new(4);
        network
    }

    /// 由节点与边构建网络，校验全部不变量
    ///
    /// 源点取第一个节点，汇点取最后一个节点
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let mut network = Self::new();

        for node in nodes {
            let id = node.id();
            if network.nodes.insert(id, node).is_some() {
                return Err(Error::DuplicateNode(id.as_u64()));
            }
        }

        for edge in edges {
            edge.validate()?;
            network.check_endpoints(edge.from(), edge.to())?;
            if network.edge_between(edge.from(), edge.to()).is_some() {
                return Err(Error::DuplicateEdge {
                    from: edge.from().as_u64(),
                    to: edge.to().as_u64(),
                });
            }
            let id = edge.id();
            if network.edges.insert(id, edge).is_some() {
                return Err(Error::DuplicateEdgeId(id.as_u64()));
            }
        }

        network.source = network.first_node_except(None).unwrap_or_default();
        network.sink = network.last_node_except(None).unwrap_or_default();
        Ok(network)
    }

    // ==================== 节点操作 ====================

    /// 添加节点，ID 为现有最大 ID + 1；标签为空时使用默认字母
    pub fn add_node(&mut self, label: Option<String>, x: f64, y: f64) -> Result<NodeId> {
        let id = NodeId::new(next_id(self.nodes.keys().map(|id| id.as_u64()))?);
        let label = match label {
            Some(label) if !label.is_empty() => label,
            _ => Node::default_label(id),
        };

        self.nodes.insert(id, Node::new(id, label, x, y));
        debug!(node = %id, "添加节点");
        Ok(id)
    }

    /// 修改节点标签；空标签保持原值
    pub fn rename_node(&mut self, id: NodeId, label: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(Error::NodeNotFound(id.as_u64()))?;
        if !label.is_empty() {
            node.set_label(label);
        }
        Ok(())
    }

    /// 移动节点
    pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(Error::NodeNotFound(id.as_u64()))?;
        node.move_to(x, y);
        Ok(())
    }

    /// 删除节点，级联删除相关边，并在源点/汇点被删除时重新指定
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(Error::NodeNotFound(id.as_u64()))?;

        let before = self.edges.len();
        self.edges.retain(|_, edge| !edge.touches(id));
        debug!(node = %id, removed_edges = before - self.edges.len(), "删除节点");

        if self.source == id {
            self.source = self.first_node_except(Some(self.sink)).unwrap_or_default();
        }
        if self.sink == id {
            self.sink = self.last_node_except(Some(self.source)).unwrap_or_default();
        }

        Ok(node)
    }

    /// 获取节点
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// 节点是否存在
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// 按插入顺序遍历节点
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// 获取节点数量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ==================== 边操作 ====================

    /// 添加边，ID 为现有最大 ID + 1
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: u64) -> Result<EdgeId> {
        if from == to {
            return Err(Error::SelfLoop(from.as_u64()));
        }
        self.check_endpoints(from, to)?;
        if self.edge_between(from, to).is_some() {
            return Err(Error::DuplicateEdge {
                from: from.as_u64(),
                to: to.as_u64(),
            });
        }

        let id = EdgeId::new(next_id(self.edges.keys().map(|id| id.as_u64()))?);
        let edge = Edge::new(id, from, to, capacity)?;

        self.edges.insert(id, edge);
        debug!(edge = %id, %from, %to, capacity, "添加边");
        Ok(id)
    }

    /// 修改边容量
    pub fn set_capacity(&mut self, id: EdgeId, capacity: u64) -> Result<()> {
        self.edges
            .get_mut(&id)
            .ok_or(Error::EdgeNotFound(id.as_u64()))?
            .set_capacity(capacity)
    }

    /// 删除边（保持剩余边的顺序）
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        self.edges
            .shift_remove(&id)
            .ok_or(Error::EdgeNotFound(id.as_u64()))
    }

    /// 获取边
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// 获取两点之间的边（有序节点对）
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edges.values().find(|edge| edge.connects(from, to))
    }

    /// 按边表顺序遍历边
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// 复制当前边表（算法只在副本上工作）
    pub fn edge_snapshot(&self) -> Vec<Edge> {
        self.edges.values().cloned().collect()
    }

    /// 获取边数量
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 设置有序节点对上的边流量
    pub fn set_flow(&mut self, from: NodeId, to: NodeId, flow: u64) -> Result<()> {
        let edge = self
            .edges
            .values_mut()
            .find(|edge| edge.connects(from, to))
            .ok_or(Error::NoEdgeBetween {
                from: from.as_u64(),
                to: to.as_u64(),
            })?;
        edge.set_flow(flow)
    }

    /// 用算法结果覆盖所有边的流量（按边 ID 匹配）
    pub fn apply_flows(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            if let Some(target) = self.edges.get_mut(&edge.id()) {
                target.set_flow(edge.flow().min(target.capacity()))?;
            }
        }
        Ok(())
    }

    /// 所有边流量归零
    pub fn reset_flows(&mut self) {
        for edge in self.edges.values_mut() {
            edge.reset_flow();
        }
    }

    // ==================== 源点 / 汇点 ====================

    /// 获取源点
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// 获取汇点
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// 设置源点
    pub fn set_source(&mut self, id: NodeId) -> Result<()> {
        if !self.contains_node(id) {
            return Err(Error::NodeNotFound(id.as_u64()));
        }
        self.source = id;
        Ok(())
    }

    /// 设置汇点
    pub fn set_sink(&mut self, id: NodeId) -> Result<()> {
        if !self.contains_node(id) {
            return Err(Error::NodeNotFound(id.as_u64()));
        }
        self.sink = id;
        Ok(())
    }

    fn check_endpoints(&self, from: NodeId, to: NodeId) -> Result<()> {
        if !self.contains_node(from) {
            return Err(Error::NodeNotFound(from.as_u64()));
        }
        if !self.contains_node(to) {
            return Err(Error::NodeNotFound(to.as_u64()));
        }
        Ok(())
    }

    /// 第一个节点，尽量避开 `avoid`
    fn first_node_except(&self, avoid: Option<NodeId>) -> Option<NodeId> {
        self.nodes
            .keys()
            .copied()
            .find(|&id| Some(id) != avoid)
            .or_else(|| self.nodes.keys().next().copied())
    }

    /// 最后一个节点，尽量避开 `avoid`
    fn last_node_except(&self, avoid: Option<NodeId>) -> Option<NodeId> {
        self.nodes
            .keys()
            .rev()
            .copied()
            .find(|&id| Some(id) != avoid)
            .or_else(|| self.nodes.keys().next_back().copied())
    }
}

/// 现有最大 ID + 1，空集合从 0 开始
fn next_id(ids: impl Iterator<Item = u64>) -> Result<u64> {
    match ids.max() {
        Some(max) => max.checked_add(1).ok_or(Error::IdExhausted(max)),
        None => Ok(0),
    }
}
