//! TaskListMachine - サーバーが確定したタスク一覧を保持する状態機械
//!
//! # 状態遷移
//! ```text
//! Idle ──load──▶ Loading ──ok──▶ Ready(list)
//!                   │
//!                   └──err──▶ Error(message)  ※一覧は空になる
//!
//! Ready/Error ──add/edit/remove──▶ ok: Ready（一覧を更新）
//!                                  err: Error（一覧はそのまま）
//! ```
//!
//! # 設計原則
//! - 楽観的更新はしない。サーバーの応答を受け取ってから一覧を変える
//! - 同じタスクへの edit/remove は発行順に番号を振り、最後に発行したものだけが確定する
//!   （古い応答は `Commit::Superseded` として捨てる）
//! - 一覧の取得は世代番号を持ち、最新の load だけが確定する
//! - `reset()` はエポックを進める。それ以前に発行した要求の応答は捨てる
//! - `detach()` 以降は一切状態を変えない（画面が消えた後の応答を無視する）
//! - ロックは await を跨いで保持しない
//!
//! # 使用例
//! ```ignore
//! let list = client.task_list();
//! list.load().await?;
//! list.add_task(NewTask::new("write report")).await?;
//! println!("{:?}", list.snapshot().counts());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::tasks::TaskGateway;
use crate::domain::{
    ClientError, NewTask, Task, TaskId, TaskListPhase, TaskListSnapshot, TaskPatch,
};

/// 操作の結果が一覧に反映されたかどうか
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit<T = ()> {
    Applied(T),
    /// より新しい要求が発行済みのため、この応答は捨てた
    Superseded,
}

impl<T> Commit<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Commit::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Commit::Applied(value) => Some(value),
            Commit::Superseded => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    snapshot: TaskListSnapshot,
    /// `reset()` のたびに進む
    epoch: u64,
    load_generation: u64,
    next_seq: u64,
    /// タスクごとに最後に発行した要求の番号（削除後も残す）
    latest: HashMap<TaskId, u64>,
}

impl Inner {
    /// 操作の開始（前回のエラーを消す）
    fn begin(&mut self) {
        self.snapshot.in_flight += 1;
        if let TaskListPhase::Error(_) = self.snapshot.phase {
            self.snapshot.phase = TaskListPhase::Ready;
        }
    }

    fn finish(&mut self) {
        self.snapshot.in_flight = self.snapshot.in_flight.saturating_sub(1);
    }

    fn issue(&mut self, id: TaskId) -> u64 {
        self.next_seq += 1;
        self.latest.insert(id, self.next_seq);
        self.next_seq
    }

    fn is_latest(&self, id: TaskId, seq: u64) -> bool {
        self.latest.get(&id) == Some(&seq)
    }

    /// 書き込み成功後のフェーズ（取得中なら取得結果を待つ）
    fn settle(&mut self) {
        if !self.snapshot.phase.is_loading() {
            self.snapshot.phase = TaskListPhase::Ready;
        }
    }
}

pub struct TaskListMachine {
    gateway: Arc<TaskGateway>,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<TaskListSnapshot>,
    lifetime: CancellationToken,
}

impl TaskListMachine {
    /// マウント直後の状態（Loading）で作成する
    pub fn new(gateway: Arc<TaskGateway>) -> Self {
        let snapshot = TaskListSnapshot::loading();
        let (snapshots, _) = watch::channel(snapshot.clone());
        Self {
            gateway,
            inner: Mutex::new(Inner {
                snapshot,
                epoch: 0,
                load_generation: 0,
                next_seq: 0,
                latest: HashMap::new(),
            }),
            snapshots,
            lifetime: CancellationToken::new(),
        }
    }

    pub fn snapshot(&self) -> TaskListSnapshot {
        self.inner.lock().snapshot.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskListSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn is_detached(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// 画面の破棄。応答待ちの呼び出しは取り消され、以後の状態変更は起きない
    pub fn detach(&self) {
        debug!("task list detached");
        self.lifetime.cancel();
    }

    /// 一覧を空にして Idle に戻す（ログアウト時など）
    pub fn reset(&self) {
        self.update(|inner| {
            inner.epoch += 1;
            inner.load_generation += 1;
            inner.latest.clear();
            inner.snapshot = TaskListSnapshot {
                in_flight: inner.snapshot.in_flight,
                ..TaskListSnapshot::idle()
            };
        });
    }

    /// 一覧を取得し直す。失敗すると一覧は空になる
    pub async fn load(&self) -> Result<Commit, ClientError> {
        let (epoch, generation) = self.start(|inner| {
            inner.load_generation += 1;
            inner.snapshot.phase = TaskListPhase::Loading;
            inner.load_generation
        })?;

        let cancel = self.lifetime.child_token();
        let result = self.gateway.list(&cancel).await;

        self.commit(epoch, result, |inner, result| {
            if inner.load_generation != generation {
                debug!(generation, "discarding stale task list");
                return Ok(Commit::Superseded);
            }
            match result {
                Ok(tasks) => {
                    debug!(count = tasks.len(), "task list loaded");
                    inner.snapshot.tasks = tasks;
                    inner.snapshot.phase = TaskListPhase::Ready;
                    Ok(Commit::Applied(()))
                }
                Err(err) => {
                    inner.snapshot.tasks.clear();
                    inner.snapshot.phase = TaskListPhase::Error(err.to_string());
                    Err(err)
                }
            }
        })
    }

    /// 作成に成功したらサーバーの返したタスクを末尾に追加する
    pub async fn add_task(&self, fields: NewTask) -> Result<Commit<Task>, ClientError> {
        let (epoch, ()) = self.start(|_| ())?;

        let cancel = self.lifetime.child_token();
        let result = self.gateway.create(&fields, &cancel).await;

        self.commit(epoch, result, |inner, result| match result {
            Ok(task) => {
                inner.snapshot.tasks.push(task.clone());
                inner.settle();
                Ok(Commit::Applied(task))
            }
            Err(err) => {
                inner.snapshot.phase = TaskListPhase::Error(err.to_string());
                Err(err)
            }
        })
    }

    /// 更新に成功したら同じ id の要素をサーバーの応答で置き換える
    pub async fn edit_task(
        &self,
        id: TaskId,
        fields: TaskPatch,
    ) -> Result<Commit<Task>, ClientError> {
        let (epoch, seq) = self.start(|inner| inner.issue(id))?;

        let cancel = self.lifetime.child_token();
        let result = self.gateway.update(id, &fields, &cancel).await;

        self.commit(epoch, result, |inner, result| {
            if !inner.is_latest(id, seq) {
                warn!(%id, seq, "discarding superseded update response");
                return result.map(|_| Commit::Superseded);
            }
            match result {
                Ok(task) => {
                    if let Some(slot) = inner.snapshot.tasks.iter_mut().find(|t| t.id == id) {
                        *slot = task.clone();
                    }
                    inner.settle();
                    Ok(Commit::Applied(task))
                }
                Err(err) => {
                    inner.snapshot.phase = TaskListPhase::Error(err.to_string());
                    Err(err)
                }
            }
        })
    }

    /// 削除に成功したら一覧から取り除く
    ///
    /// 削除の成功は順序に関係なく確定する（サーバーにはもう無い）。
    /// 失敗は最新の要求のときだけ反映する。
    pub async fn remove_task(&self, id: TaskId) -> Result<Commit, ClientError> {
        let (epoch, seq) = self.start(|inner| inner.issue(id))?;

        let cancel = self.lifetime.child_token();
        let result = self.gateway.delete(id, &cancel).await;

        self.commit(epoch, result, |inner, result| match result {
            Ok(()) => {
                inner.snapshot.tasks.retain(|task| task.id != id);
                inner.settle();
                Ok(Commit::Applied(()))
            }
            Err(err) if !inner.is_latest(id, seq) => {
                warn!(%id, seq, "discarding superseded delete failure");
                Err(err)
            }
            Err(err) => {
                inner.snapshot.phase = TaskListPhase::Error(err.to_string());
                Err(err)
            }
        })
    }

    /// 操作を開始し、発行時のエポックを返す
    fn start<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<(u64, R), ClientError> {
        if self.is_detached() {
            return Err(ClientError::Cancelled);
        }
        Ok(self.update(|inner| {
            inner.begin();
            (inner.epoch, f(inner))
        }))
    }

    /// 応答を状態に反映する
    ///
    /// detach 済みなら何もしない。`reset()` を跨いだ応答は一覧に触れずに捨てる。
    fn commit<T, R>(
        &self,
        epoch: u64,
        result: Result<T, ClientError>,
        apply: impl FnOnce(&mut Inner, Result<T, ClientError>) -> Result<Commit<R>, ClientError>,
    ) -> Result<Commit<R>, ClientError> {
        if self.is_detached() {
            debug!("response arrived after detach; ignored");
            return Err(ClientError::Cancelled);
        }
        if let Err(ClientError::Cancelled) = result {
            self.update(Inner::finish);
            return Err(ClientError::Cancelled);
        }
        self.update(|inner| {
            inner.finish();
            if inner.epoch != epoch {
                debug!(epoch, current = inner.epoch, "discarding response issued before reset");
                return result.map(|_| Commit::Superseded);
            }
            apply(inner, result)
        })
    }

    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock();
        let out = f(&mut inner);
        self.snapshots.send_replace(inner.snapshot.clone());
        out
    }
}

impl Drop for TaskListMachine {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
