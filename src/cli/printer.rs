//! 结果打印器
//!
//! 将步骤序列、边表和运行摘要格式化为终端输出

use crate::algorithm::{RunOutcome, Step};
use crate::graph::{FlowNetwork, NodeId};
use colored::Colorize;
use prettytable::{format, row, Table};
use std::collections::BTreeMap;

/// 结果打印器
pub struct Printer {
    labels: BTreeMap<NodeId, String>,
}

impl Printer {
    /// 用网络中的节点标签创建打印器
    pub fn new(network: &FlowNetwork) -> Self {
        Self {
            labels: network
                .nodes()
                .map(|node| (node.id(), node.label().to_string()))
                .collect(),
        }
    }

    /// 节点显示名，未知节点显示为 `#id`
    pub fn label(&self, id: NodeId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id))
    }

    /// 路径显示为 `A -> B -> C`
    pub fn path(&self, path: &[NodeId]) -> String {
        path.iter()
            .map(|&id| self.label(id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// 单个步骤
    pub fn format_step(&self, index: usize, step: &Step) -> String {
        let body = match step {
            Step::Visit { node, queue, .. } => {
                let mut line = format!("{} {}", "访问".cyan(), self.label(*node));
                if let Some(queue) = queue {
                    line.push_str(&format!("  队列: [{}]", self.list(queue)));
                }
                line
            }
            Step::EdgeProbe { from, to } => {
                format!("{} {}", "检查边".yellow(), self.path(&[*from, *to]))
            }
            Step::PathFound { path } => {
                format!("{} {}", "找到路径".green().bold(), self.path(path))
            }
            Step::FlowUpdate {
                from,
                to,
                flow,
                path_flow,
            } => format!(
                "{} {} = {} (+{})",
                "更新流量".magenta(),
                self.path(&[*from, *to]),
                flow,
                path_flow
            ),
            Step::FlowTotal { value } => format!("{} {}", "当前总流量".blue().bold(), value),
        };
        format!("[{:>3}] {}", index, body)
    }

    /// 边表：容量、流量、残余
    pub fn edge_table(&self, network: &FlowNetwork) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["ID", "起点", "终点", "容量", "流量", "残余"]);
        for edge in network.edges() {
            table.add_row(row![
                edge.id().to_string(),
                self.label(edge.from()),
                self.label(edge.to()),
                edge.capacity().to_string(),
                edge.flow().to_string(),
                edge.residual().to_string()
            ]);
        }
        table.to_string()
    }

    /// 运行摘要
    pub fn summary(&self, network: &FlowNetwork, outcome: &RunOutcome) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["属性", "值"]);
        table.add_row(row!["源点", self.label(network.source())]);
        table.add_row(row!["汇点", self.label(network.sink())]);
        table.add_row(row!["步骤数", outcome.steps().len().to_string()]);

        match outcome {
            RunOutcome::Traversal(result) => {
                let path = if result.path.is_empty() {
                    "不可达".to_string()
                } else {
                    self.path(&result.path)
                };
                table.add_row(row!["路径", path]);
            }
            RunOutcome::MaxFlow(result) => {
                table.add_row(row!["最大流", result.value.to_string()]);
                table.add_row(row!["增广轮数", result.rounds.to_string()]);
                let frontier = format!(
                    "{} (容量 {})",
                    result
                        .frontier_edges()
                        .iter()
                        .map(|e| self.path(&[e.from(), e.to()]))
                        .collect::<Vec<_>>()
                        .join(", "),
                    result.frontier_capacity()
                );
                // 前沿容量大于流值时不是最小割
                let title = if result.is_min_cut() { "最小割" } else { "饱和前沿" };
                table.add_row(row![title, frontier]);
            }
        }
        table.to_string()
    }

    fn list(&self, ids: &[NodeId]) -> String {
        ids.iter()
            .map(|&id| self.label(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
