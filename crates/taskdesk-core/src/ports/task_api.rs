//! TaskApi port - タスクサービスの CRUD
//!
//! 非 2xx 応答も接続失敗も `ApiError` に畳み込む。
//! 利用者向けメッセージへの変換は app 層（TaskGateway）が行う。

use async_trait::async_trait;

use crate::domain::{ApiError, NewTask, Task, TaskId, TaskPatch};

/// TaskApi はタスクサービスへの呼び出し
///
/// # Thread Safety
/// - `Send + Sync` を要求（`Arc<dyn TaskApi>` で共有する）
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /tasks`（サーバーの返す順序のまま）
    async fn list(&self) -> Result<Vec<Task>, ApiError>;

    /// `POST /tasks`
    async fn create(&self, fields: &NewTask) -> Result<Task, ApiError>;

    /// `PUT /tasks/{id}`
    async fn update(&self, id: TaskId, fields: &TaskPatch) -> Result<Task, ApiError>;

    /// `DELETE /tasks/{id}`
    async fn delete(&self, id: TaskId) -> Result<(), ApiError>;
}
