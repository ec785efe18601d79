//! テスト用の TaskApi: 応答のタイミングをテスト側が握る
//!
//! 呼び出しは到着順に `calls` へ流れ、テストが `Call::reply` するまで返らない。
//! 応答の順序を入れ替えて競合を再現するために使う。

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{mpsc, oneshot};

use crate::domain::{ApiError, NewTask, Task, TaskId, TaskOp, TaskPatch, TaskStatus, UserId};
use crate::ports::TaskApi;

/// サーバーが返しそうなタスク（時刻は固定）
pub(crate) fn task(id: i64, title: &str, status: TaskStatus) -> Task {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single().unwrap_or_default();
    Task {
        id: TaskId::new(id),
        user_id: UserId::new(1),
        title: title.to_string(),
        description: None,
        status,
        created_at: at,
        updated_at: at,
    }
}

#[derive(Debug)]
pub(crate) enum Response {
    Tasks(Vec<Task>),
    Task(Task),
    Done,
}

#[derive(Debug)]
pub(crate) struct Call {
    pub op: TaskOp,
    pub id: Option<TaskId>,
    reply: oneshot::Sender<Result<Response, ApiError>>,
}

impl Call {
    pub fn reply(self, response: Result<Response, ApiError>) {
        // 呼び出し側が取り消し済みなら受け手はいない
        let _ = self.reply.send(response);
    }
}

pub(crate) struct GatedTaskApi {
    calls: mpsc::UnboundedSender<Call>,
}

impl GatedTaskApi {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Call>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }

    async fn request(&self, op: TaskOp, id: Option<TaskId>) -> Result<Response, ApiError> {
        let (reply, response) = oneshot::channel();
        self.calls
            .send(Call { op, id, reply })
            .map_err(|_| ApiError::transport())?;
        response.await.map_err(|_| ApiError::transport())?
    }
}

fn unexpected(response: Response) -> ApiError {
    ApiError::status(500, Some(format!("unexpected stub response: {response:?}")))
}

#[async_trait]
impl TaskApi for GatedTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        match self.request(TaskOp::List, None).await? {
            Response::Tasks(tasks) => Ok(tasks),
            other => Err(unexpected(other)),
        }
    }

    async fn create(&self, _fields: &NewTask) -> Result<Task, ApiError> {
        match self.request(TaskOp::Create, None).await? {
            Response::Task(task) => Ok(task),
            other => Err(unexpected(other)),
        }
    }

    async fn update(&self, id: TaskId, _fields: &TaskPatch) -> Result<Task, ApiError> {
        match self.request(TaskOp::Update, Some(id)).await? {
            Response::Task(task) => Ok(task),
            other => Err(unexpected(other)),
        }
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        match self.request(TaskOp::Delete, Some(id)).await? {
            Response::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}
