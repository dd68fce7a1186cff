//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("节点不存在: {0}")]
    NodeNotFound(u64),

    #[error("边不存在: {0}")]
    EdgeNotFound(u64),

    #[error("两点之间没有边: {from} -> {to}")]
    NoEdgeBetween { from: u64, to: u64 },

    #[error("节点 ID 重复: {0}")]
    DuplicateNode(u64),

    #[error("边 ID 重复: {0}")]
    DuplicateEdgeId(u64),

    #[error("不允许自环: {0} -> {0}")]
    SelfLoop(u64),

    #[error("边已存在: {from} -> {to}")]
    DuplicateEdge { from: u64, to: u64 },

    #[error("ID 已用尽: 现有最大 ID 为 {0}")]
    IdExhausted(u64),

    #[error("容量必须为正整数: {0}")]
    InvalidCapacity(u64),

    #[error("流量超出容量: 边 {edge} 流量 {flow} > 容量 {capacity}")]
    FlowExceedsCapacity { edge: u64, flow: u64, capacity: u64 },

    #[error("至少需要两个节点才能运行算法")]
    NotEnoughNodes,

    #[error("至少需要一条边才能运行算法")]
    NoEdges,

    #[error("源点与汇点不能相同: {0}")]
    SourceEqualsSink(u64),

    #[error("已有算法正在运行")]
    RunInProgress,

    #[error("未知算法: {0}")]
    UnknownAlgorithm(String),

    #[error("无效的播放间隔: {0} ms")]
    InvalidTick(u64),

    #[error("导入错误: {0}")]
    ImportError(String),

    #[error("服务器错误: {0}")]
    ServerError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    SerializationError(#[from] serde_json::Error),
}
