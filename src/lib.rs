//! flowtrace - 图遍历与最大流算法的逐步演示
//!
//! 在小型有向带容量图上运行算法并记录完整步骤序列，支持：
//! - BFS / DFS 路径查找，记录每次访问、检查边与父节点快照
//! - Ford-Fulkerson / Edmonds-Karp 最大流，记录每轮增广与流量更新
//! - 按固定节拍回放步骤，可在任意节拍边界停止
//! - JSON 图文档导入导出与 HTTP API

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod import;
pub mod player;
pub mod server;
pub mod session;

// 重导出常用类型
pub use algorithm::{Algorithm, PathStrategy, RunOutcome, Step, StepTrace};
pub use config::{ServerConfig, SessionConfig};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeId, FlowNetwork, Node, NodeId};
pub use import::GraphDocument;
pub use player::{DisplayState, Player};
pub use session::Session;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
