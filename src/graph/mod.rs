//! 图核心模块
//!
//! 定义节点、带容量的有向边和可编辑的流网络

mod edge;
mod network;
mod node;

pub use edge::{Edge, EdgeId};
pub use network::FlowNetwork;
pub use node::{Node, NodeId};
