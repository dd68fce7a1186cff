//! 步骤回放
//!
//! 每个节拍应用一个步骤到渲染可见的状态；停止只发生在节拍边界，
//! 因此外部永远观察不到应用了一半的步骤

use crate::algorithm::{Step, StepTrace};
use crate::graph::{Edge, NodeId};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 渲染器可见的状态
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    /// 已访问节点（按访问顺序，跨轮次累积）
    pub visited_nodes: Vec<NodeId>,
    /// 当前高亮路径
    pub current_path: Vec<NodeId>,
    /// 正在检查的边（仅持续到下一个步骤）
    pub probe: Option<(NodeId, NodeId)>,
    /// 边及其显示流量
    pub edges: Vec<Edge>,
    /// 显示的最大流
    pub max_flow: u64,
}

impl DisplayState {
    fn new(edges: Vec<Edge>) -> Self {
        Self {
            edges,
            ..Self::default()
        }
    }

    /// 应用单个步骤
    pub fn apply(&mut self, step: &Step) {
        self.probe = None;
        match step {
            Step::Visit { node, .. } => self.visited_nodes.push(*node),
            Step::EdgeProbe { from, to } => self.probe = Some((*from, *to)),
            Step::PathFound { path } => self.current_path = path.clone(),
            Step::FlowUpdate { from, to, flow, .. } => {
                match self.edges.iter_mut().find(|e| e.connects(*from, *to)) {
                    Some(edge) => {
                        if let Err(e) = edge.set_flow(*flow) {
                            warn!(error = %e, "忽略越界的流量更新");
                        }
                    }
                    None => warn!(%from, %to, "流量更新对应的边不存在"),
                }
            }
            Step::FlowTotal { value } => self.max_flow = *value,
        }
    }

    /// 清空显示并将流量归零
    fn clear(&mut self) {
        self.visited_nodes.clear();
        self.current_path.clear();
        self.probe = None;
        self.max_flow = 0;
        for edge in &mut self.edges {
            edge.reset_flow();
        }
    }
}

/// 回放结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// 所有步骤都已应用
    Finished { applied: usize },
    /// 在节拍边界被停止
    Stopped { applied: usize },
}

/// 步骤播放器
#[derive(Debug, Clone)]
pub struct Player {
    trace: StepTrace,
    cursor: usize,
    display: DisplayState,
}

impl Player {
    /// 用步骤序列和初始边状态创建播放器
    pub fn new(trace: StepTrace, edges: Vec<Edge>) -> Self {
        Self {
            trace,
            cursor: 0,
            display: DisplayState::new(edges),
        }
    }

    /// 应用下一个步骤，没有剩余步骤时返回 false
    pub fn step(&mut self) -> bool {
        let Some(step) = self.trace.get(self.cursor) else {
            return false;
        };
        self.display.apply(step);
        self.cursor += 1;
        true
    }

    /// 最近一次应用的步骤
    pub fn last_applied(&self) -> Option<&Step> {
        self.cursor.checked_sub(1).and_then(|i| self.trace.get(i))
    }

    /// 立即应用所有剩余步骤
    pub fn finish(&mut self) -> usize {
        let mut applied = 0;
        while self.step() {
            applied += 1;
        }
        applied
    }

    /// 清空显示、流量归零并回到第一个步骤
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.display.clear();
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.trace.len()
    }

    /// 已应用的步骤数
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn trace(&self) -> &StepTrace {
        &self.trace
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// 按节拍回放，每个节拍应用一个步骤
    ///
    /// `stop` 变为 true 后在下一个节拍边界停止；发送端被丢弃时继续播放到结束
    pub async fn play<F>(
        &mut self,
        tick: Duration,
        mut stop: watch::Receiver<bool>,
        mut on_step: F,
    ) -> PlaybackEnd
    where
        F: FnMut(&Step, &DisplayState),
    {
        let mut applied = 0;
        let mut stoppable = true;
        info!(steps = self.trace.len() - self.cursor, tick_ms = tick.as_millis() as u64, "开始回放");

        while !self.is_finished() {
            if *stop.borrow() {
                info!(applied, position = self.cursor, "回放已停止");
                return PlaybackEnd::Stopped { applied };
            }

            tokio::select! {
                _ = tokio::time::sleep(tick) => {
                    if self.step() {
                        applied += 1;
                        if let Some(step) = self.last_applied() {
                            debug!(position = self.cursor, kind = step.kind(), "应用步骤");
                            on_step(step, &self.display);
                        }
                    }
                }
                changed = stop.changed(), if stoppable => {
                    if changed.is_err() {
                        stoppable = false;
                    }
                }
            }
        }

        info!(applied, "回放完成");
        PlaybackEnd::Finished { applied }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{max_flow, PathStrategy};
    use crate::graph::FlowNetwork;

    fn ek_player() -> (Player, u64) {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = max_flow(&edges, NodeId::new(0), NodeId::new(4), PathStrategy::Bfs);
        (Player::new(result.steps, edges), result.value)
    }

    #[test]
    fn test_finish_reproduces_final_state() {
        let edges = FlowNetwork::demo().edge_snapshot();
        let result = max_flow(&edges, NodeId::new(0), NodeId::new(4), PathStrategy::Bfs);
        let mut player = Player::new(result.steps.clone(), edges);

        let applied = player.finish();
        assert_eq!(applied, result.steps.len());
        assert!(player.is_finished());
        assert!(!player.step());

        let display = player.display();
        assert_eq!(display.max_flow, result.value);
        assert_eq!(display.edges, result.edges);
        assert_eq!(
            display.current_path,
            vec![NodeId::new(0), NodeId::new(5), NodeId::new(3), NodeId::new(4)]
        );
    }

    #[test]
    fn test_step_by_step() {
        let (mut player, _) = ek_player();

        assert!(player.last_applied().is_none());
        assert!(player.step());
        assert_eq!(player.display().visited_nodes, vec![NodeId::new(0)]);

        assert!(player.step());
        assert!(matches!(player.last_applied(), Some(Step::EdgeProbe { .. })));
        assert_eq!(
            player.display().probe,
            Some((NodeId::new(0), NodeId::new(1)))
        );

        // 探边高亮只持续一个步骤
        assert!(player.step());
        assert_eq!(player.display().probe, None);
        assert_eq!(player.position(), 3);
    }

    #[test]
    fn test_reset_clears_display() {
        let (mut player, _) = ek_player();
        player.finish();
        player.reset();

        assert_eq!(player.position(), 0);
        let display = player.display();
        assert!(display.visited_nodes.is_empty());
        assert!(display.current_path.is_empty());
        assert_eq!(display.max_flow, 0);
        assert!(display.edges.iter().all(|e| e.flow() == 0));
    }

    #[tokio::test]
    async fn test_play_to_end() {
        let (mut player, value) = ek_player();
        let (_tx, rx) = watch::channel(false);
        let mut seen = 0;

        let end = player
            .play(Duration::from_millis(1), rx, |_, _| seen += 1)
            .await;

        assert_eq!(end, PlaybackEnd::Finished { applied: seen });
        assert_eq!(seen, player.trace().len());
        assert_eq!(player.display().max_flow, value);
    }

    #[tokio::test]
    async fn test_play_stops_at_tick_boundary() {
        let (mut player, _) = ek_player();
        let (tx, rx) = watch::channel(false);
        let mut seen = 0;

        let end = player
            .play(Duration::from_millis(1), rx, |_, _| {
                seen += 1;
                if seen == 3 {
                    let _ = tx.send(true);
                }
            })
            .await;

        assert_eq!(end, PlaybackEnd::Stopped { applied: 3 });
        assert_eq!(player.position(), 3);
        assert!(!player.is_finished());
        assert_eq!(player.display().visited_nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_sender_keeps_playing() {
        let (mut player, _) = ek_player();
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let end = player.play(Duration::from_millis(1), rx, |_, _| {}).await;
        assert!(matches!(end, PlaybackEnd::Finished { .. }));
    }
}
