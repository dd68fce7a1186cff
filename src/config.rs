//! 配置
//!
//! 会话配置（算法选择、回放节奏）和服务器配置

use crate::algorithm::{Algorithm, PathStrategy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认每步间隔（毫秒）
pub const DEFAULT_TICK_MS: u64 = 500;

/// 会话配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// 当前选择的算法
    pub algorithm: Algorithm,
    /// Ford-Fulkerson 使用的路径查找策略
    pub search: PathStrategy,
    /// 回放间隔（毫秒，必须为正）
    pub tick_ms: u64,
    /// 最大流是否从网络现有流量继续（默认每次运行前清零）
    pub resume_flows: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Bfs,
            search: PathStrategy::Dfs,
            tick_ms: DEFAULT_TICK_MS,
            resume_flows: false,
        }
    }
}

impl SessionConfig {
    /// 回放间隔
    pub fn tick(&self) -> Result<Duration> {
        if self.tick_ms == 0 {
            return Err(Error::InvalidTick(self.tick_ms));
        }
        Ok(Duration::from_millis(self.tick_ms))
    }
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// 监听地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.algorithm, Algorithm::Bfs);
        assert_eq!(config.search, PathStrategy::Dfs);
        assert_eq!(config.tick().unwrap(), Duration::from_millis(500));
        assert!(!config.resume_flows);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = SessionConfig {
            tick_ms: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.tick(), Err(Error::InvalidTick(0))));
    }

    #[test]
    fn test_partial_config_json() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"algorithm":"edmondsKarp","tickMs":40}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::EdmondsKarp);
        assert_eq!(config.tick_ms, 40);
        assert_eq!(config.search, PathStrategy::Dfs);
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(ServerConfig::default().addr(), "127.0.0.1:8080");
    }
}
