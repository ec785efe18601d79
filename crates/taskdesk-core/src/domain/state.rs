//! State - タスク一覧の状態
//!
//! # 状態遷移
//! - idle: まだ何も読み込んでいない（空）
//! - loading: 一覧を取得中（マウント直後の初期状態）
//! - ready: サーバーが確定した一覧を保持
//! - error: 直前の操作が失敗（メッセージ付き）
//!
//! 一覧の取得に失敗したときだけ一覧を空にする。
//! 作成・更新・削除の失敗では一覧はそのまま残る。

use serde::Serialize;

use super::ids::TaskId;
use super::task::{StatusCounts, Task};

/// TaskListPhase はタスク一覧のフェーズ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum TaskListPhase {
    Idle,
    Loading,
    Ready,
    Error(String),
}

impl TaskListPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, TaskListPhase::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskListPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// 購読者に配る不変のスナップショット
///
/// JSON では `phase`（と `message`）が最上位に並ぶ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskListSnapshot {
    #[serde(flatten)]
    pub phase: TaskListPhase,
    pub tasks: Vec<Task>,
    /// 応答待ちのゲートウェイ呼び出し数
    pub in_flight: usize,
}

impl TaskListSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: TaskListPhase::Idle,
            tasks: Vec::new(),
            in_flight: 0,
        }
    }

    pub fn loading() -> Self {
        Self {
            phase: TaskListPhase::Loading,
            ..Self::idle()
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.tasks)
    }
}

impl Default for TaskListSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phase_serializes_with_message() {
        let phase = TaskListPhase::Error("boom".into());
        assert_eq!(
            serde_json::to_value(&phase).unwrap(),
            json!({ "phase": "error", "message": "boom" })
        );
        assert_eq!(
            serde_json::to_value(TaskListPhase::Ready).unwrap(),
            json!({ "phase": "ready" })
        );
    }

    #[test]
    fn snapshot_phase_is_not_nested() {
        assert_eq!(
            serde_json::to_value(TaskListSnapshot::idle()).unwrap(),
            json!({ "phase": "idle", "tasks": [], "in_flight": 0 })
        );

        let failed = TaskListSnapshot {
            phase: TaskListPhase::Error("boom".into()),
            ..TaskListSnapshot::idle()
        };
        assert_eq!(
            serde_json::to_value(failed).unwrap(),
            json!({ "phase": "error", "message": "boom", "tasks": [], "in_flight": 0 })
        );
    }

    #[test]
    fn loading_snapshot_is_empty() {
        let snapshot = TaskListSnapshot::loading();
        assert!(snapshot.phase.is_loading());
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.error(), None);
        assert!(!snapshot.is_busy());
    }
}
