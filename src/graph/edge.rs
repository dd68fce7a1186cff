//! 边定义
//!
//! 有向带容量边；同一有序节点对最多一条边，反向边 (to, from) 是独立的真实边

use crate::error::{Error, Result};
use crate::graph::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 边 ID（网络内唯一）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 边
///
/// 不变量：`0 <= flow <= capacity`，`capacity > 0`，`from != to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// 边 ID
    id: EdgeId,
    /// 起点
    from: NodeId,
    /// 终点
    to: NodeId,
    /// 容量
    capacity: u64,
    /// 当前流量
    #[serde(default)]
    flow: u64,
}

impl Edge {
    /// 创建新边（流量为 0）
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, capacity: u64) -> Result<Self> {
        if from == to {
            return Err(Error::SelfLoop(from.as_u64()));
        }
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self {
            id,
            from,
            to,
            capacity,
            flow: 0,
        })
    }

    /// 创建带初始流量的边
    pub fn with_flow(id: EdgeId, from: NodeId, to: NodeId, capacity: u64, flow: u64) -> Result<Self> {
        let mut edge = Self::new(id, from, to, capacity)?;
        edge.set_flow(flow)?;
        Ok(edge)
    }

    /// 校验反序列化得到的边
    pub(crate) fn validate(&self) -> Result<()> {
        if self.from == self.to {
            return Err(Error::SelfLoop(self.from.as_u64()));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidCapacity(self.capacity));
        }
        if self.flow > self.capacity {
            return Err(self.overflow(self.flow));
        }
        Ok(())
    }

    /// 获取边 ID
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// 获取起点
    pub fn from(&self) -> NodeId {
        self.from
    }

    /// 获取终点
    pub fn to(&self) -> NodeId {
        self.to
    }

    /// 是否连接给定的有序节点对
    pub fn connects(&self, from: NodeId, to: NodeId) -> bool {
        self.from == from && self.to == to
    }

    /// 是否与节点相连（作为起点或终点）
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// 获取容量
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// 修改容量，当前流量超出时截断到新容量
    pub fn set_capacity(&mut self, capacity: u64) -> Result<()> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        self.capacity = capacity;
        self.flow = self.flow.min(capacity);
        Ok(())
    }

    /// 获取当前流量
    pub fn flow(&self) -> u64 {
        self.flow
    }

    /// 设置流量
    pub fn set_flow(&mut self, flow: u64) -> Result<()> {
        if flow > self.capacity {
            return Err(self.overflow(flow));
        }
        self.flow = flow;
        Ok(())
    }

    /// 流量归零
    pub fn reset_flow(&mut self) {
        self.flow = 0;
    }

    /// 残余容量 = 容量 - 已用流量
    pub fn residual(&self) -> u64 {
        self.capacity - self.flow
    }

    /// 残余容量为正时才可通行
    pub fn has_residual(&self) -> bool {
        self.residual() > 0
    }

    /// 沿正向边增广，返回新流量
    pub fn augment(&mut self, amount: u64) -> Result<u64> {
        if amount > self.residual() {
            return Err(self.overflow(self.flow + amount));
        }
        self.flow += amount;
        Ok(self.flow)
    }

    fn overflow(&self, flow: u64) -> Error {
        Error::FlowExceedsCapacity {
            edge: self.id.as_u64(),
            flow,
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(capacity: u64) -> Edge {
        Edge::new(EdgeId::new(1), NodeId::new(0), NodeId::new(1), capacity).unwrap()
    }

    #[test]
    fn test_edge_rejects_self_loop() {
        let result = Edge::new(EdgeId::new(1), NodeId::new(2), NodeId::new(2), 5);
        assert!(matches!(result, Err(Error::SelfLoop(2))));
    }

    #[test]
    fn test_edge_rejects_zero_capacity() {
        let result = Edge::new(EdgeId::new(1), NodeId::new(0), NodeId::new(1), 0);
        assert!(matches!(result, Err(Error::InvalidCapacity(0))));
    }

    #[test]
    fn test_edge_residual() {
        let mut e = edge(10);
        assert_eq!(e.residual(), 10);

        assert_eq!(e.augment(4).unwrap(), 4);
        assert_eq!(e.residual(), 6);
        assert!(e.has_residual());

        assert_eq!(e.augment(6).unwrap(), 10);
        assert!(!e.has_residual());
        assert!(e.augment(1).is_err());
        assert_eq!(e.flow(), 10);
    }

    #[test]
    fn test_edge_flow_bounds() {
        let mut e = edge(8);
        assert!(e.set_flow(9).is_err());
        e.set_flow(8).unwrap();

        // 缩小容量时流量随之截断
        e.set_capacity(3).unwrap();
        assert_eq!(e.flow(), 3);
        assert!(e.set_capacity(0).is_err());

        e.reset_flow();
        assert_eq!(e.flow(), 0);
    }

    #[test]
    fn test_edge_missing_flow_defaults_to_zero() {
        let e: Edge = serde_json::from_str(r#"{"id":7,"from":1,"to":2,"capacity":9}"#).unwrap();
        assert_eq!(e.id(), EdgeId::new(7));
        assert!(e.connects(NodeId::new(1), NodeId::new(2)));
        assert_eq!(e.flow(), 0);
    }
}
