//! 节点定义
//!
//! 节点只携带标识、显示标签和平面坐标；坐标归编辑器/渲染器所有，算法不读取

use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点 ID（网络内唯一、稳定的非负整数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 节点 ID
    id: NodeId,
    /// 显示标签（不要求唯一）
    label: String,
    /// 横坐标
    x: f64,
    /// 纵坐标
    y: f64,
}

impl Node {
    /// 创建新节点
    pub fn new(id: NodeId, label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id,
            label: label.into(),
            x,
            y,
        }
    }

    /// 按 ID 生成默认标签：A, B, C, ... Z, A, ...
    pub fn default_label(id: NodeId) -> String {
        let offset = (id.as_u64() % 26) as u8;
        char::from(b'A' + offset).to_string()
    }

    /// 获取节点 ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// 获取标签
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 设置标签
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// 获取坐标
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// 移动节点
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}
