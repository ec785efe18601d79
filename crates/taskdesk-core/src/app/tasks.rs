//! TaskGateway - タスクサービス呼び出しの窓口
//!
//! # 学習ポイント
//! - 非 2xx も接続失敗も `TaskApiError` 1 種類に畳み込む（401 も特別扱いしない）
//! - 呼び出しごとに `CancellationToken` を受け取り、キャンセルされたら応答を待たずに返る
//! - リトライはしない

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::activity::Activity;
use crate::domain::{
    ApiError, ClientError, NewTask, Task, TaskApiError, TaskId, TaskOp, TaskPatch,
};
use crate::ports::TaskApi;

pub struct TaskGateway {
    api: Arc<dyn TaskApi>,
    activity: Activity,
}

impl TaskGateway {
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self {
            api,
            activity: Activity::default(),
        }
    }

    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<Task>, ClientError> {
        self.call(TaskOp::List, cancel, self.api.list()).await
    }

    pub async fn create(
        &self,
        fields: &NewTask,
        cancel: &CancellationToken,
    ) -> Result<Task, ClientError> {
        self.call(TaskOp::Create, cancel, self.api.create(fields)).await
    }

    pub async fn update(
        &self,
        id: TaskId,
        fields: &TaskPatch,
        cancel: &CancellationToken,
    ) -> Result<Task, ClientError> {
        self.call(TaskOp::Update, cancel, self.api.update(id, fields)).await
    }

    pub async fn delete(&self, id: TaskId, cancel: &CancellationToken) -> Result<(), ClientError> {
        self.call(TaskOp::Delete, cancel, self.api.delete(id)).await
    }

    pub fn is_loading(&self) -> bool {
        self.activity.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.activity.last_error()
    }

    async fn call<T>(
        &self,
        op: TaskOp,
        cancel: &CancellationToken,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ClientError> {
        let _busy = self.activity.begin();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(?op, "task request cancelled");
                return Err(ClientError::Cancelled);
            }
            result = request => result,
        };

        result.map_err(|api| {
            let err = TaskApiError::from_api(op, &api);
            warn!(?op, status = ?err.status_code, "{}", err.message);
            self.activity.fail(err.message.clone());
            err.into()
        })
    }
}
