//! In-memory な AuthApi / TaskApi（開発用・テスト用）
//!
//! # 学習ポイント
//! - サーバーの振る舞い（採番、タイムスタンプ、404、重複登録）を最小限に再現
//! - `fail_next` で次の 1 回だけ失敗させられる（エラー経路のテスト用）

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;

use crate::domain::{ApiError, Credentials, NewTask, Task, TaskId, TaskOp, TaskPatch, UserId};
use crate::ports::{AuthApi, LoginResponse, RegisterResponse, TaskApi};

/// 署名なしの token を作る（payload だけが意味を持つ）
pub fn unsigned_token(user_id: UserId, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({ "alg": "none", "typ": "JWT" }).to_string());
    let claims = json!({ "userId": user_id.get(), "email": email });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.unsigned")
}

#[derive(Debug)]
struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    next_user_id: i64,
}

/// InMemoryAuthApi はアカウントを HashMap で保持
#[derive(Debug, Default)]
pub struct InMemoryAuthApi {
    state: Mutex<AuthState>,
}

impl InMemoryAuthApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthApi for InMemoryAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let state = self.state.lock();
        match state.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => Ok(LoginResponse {
                access_token: unsigned_token(account.user_id, &credentials.email),
            }),
            _ => Err(ApiError::status(401, Some("Invalid credentials".into()))),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        let mut state = self.state.lock();
        if state.accounts.contains_key(&credentials.email) {
            return Err(ApiError::status(409, Some("Email already registered".into())));
        }
        state.next_user_id += 1;
        let user_id = UserId::new(state.next_user_id);
        state.accounts.insert(
            credentials.email.clone(),
            Account {
                user_id,
                password: credentials.password.clone(),
            },
        );
        Ok(RegisterResponse {
            user_id,
            message: "User registered".into(),
        })
    }
}

#[derive(Debug)]
struct TaskState {
    owner: UserId,
    tasks: Vec<Task>,
    next_id: i64,
    failures: HashMap<TaskOp, ApiError>,
}

/// InMemoryTaskApi は 1 ユーザー分のタスクを保持
#[derive(Debug)]
pub struct InMemoryTaskApi {
    state: Mutex<TaskState>,
}

impl InMemoryTaskApi {
    pub fn new(owner: UserId) -> Self {
        Self {
            state: Mutex::new(TaskState {
                owner,
                tasks: Vec::new(),
                next_id: 1,
                failures: HashMap::new(),
            }),
        }
    }

    /// 既存タスク入りで作成（id の採番は最大値の次から）
    pub fn with_tasks(owner: UserId, tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        let api = Self::new(owner);
        {
            let mut state = api.state.lock();
            state.tasks = tasks;
            state.next_id = next_id;
        }
        api
    }

    /// 次の `op` 呼び出しを 1 回だけ失敗させる
    pub fn fail_next(&self, op: TaskOp, error: ApiError) {
        self.state.lock().failures.insert(op, error);
    }

    /// サーバー側の現在の一覧
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    fn take_failure(state: &mut TaskState, op: TaskOp) -> Result<(), ApiError> {
        match state.failures.remove(&op) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn not_found(id: TaskId) -> ApiError {
    ApiError::status(404, Some(format!("Task with ID {} not found", id.get())))
}

#[async_trait]
impl TaskApi for InMemoryTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, TaskOp::List)?;
        Ok(state.tasks.clone())
    }

    async fn create(&self, fields: &NewTask) -> Result<Task, ApiError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, TaskOp::Create)?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(state.next_id),
            user_id: state.owner,
            title: fields.title.clone(),
            description: fields.description.clone(),
            status: fields.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        state.next_id += 1;
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, fields: &TaskPatch) -> Result<Task, ApiError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, TaskOp::Update)?;

        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| not_found(id))?;
        if let Some(title) = &fields.title {
            task.title = title.clone();
        }
        if let Some(description) = &fields.description {
            // 空文字は説明の消去
            task.description = (!description.is_empty()).then(|| description.clone());
        }
        if let Some(status) = fields.status {
            task.status = status;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, TaskOp::Delete)?;

        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BearerToken, TaskStatus};

    #[tokio::test]
    async fn register_then_login_issues_decodable_token() {
        let api = InMemoryAuthApi::new();
        let creds = Credentials::new("a@b.com", "secret");

        let registered = api.register(&creds).await.unwrap();
        assert_eq!(registered.user_id, UserId::new(1));

        let login = api.login(&creds).await.unwrap();
        let session = BearerToken::new(login.access_token).decode().unwrap();
        assert_eq!(session.user_id, UserId::new(1));
        assert_eq!(session.email, "a@b.com");
    }

    #[tokio::test]
    async fn duplicate_registration_and_bad_password_fail() {
        let api = InMemoryAuthApi::new();
        let creds = Credentials::new("a@b.com", "secret");
        api.register(&creds).await.unwrap();

        let err = api.register(&creds).await.unwrap_err();
        assert_eq!(err.status_code, Some(409));

        let err = api
            .login(&Credentials::new("a@b.com", "nope!!"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn task_ids_are_assigned_in_order() {
        let api = InMemoryTaskApi::new(UserId::new(7));
        let a = api.create(&NewTask::new("a")).await.unwrap();
        let b = api
            .create(&NewTask::new("b").with_status(TaskStatus::Completed))
            .await
            .unwrap();

        assert_eq!((a.id.get(), b.id.get()), (1, 2));
        assert_eq!(a.status, TaskStatus::Pending);
        assert_eq!(b.user_id, UserId::new(7));
        assert_eq!(api.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn injected_failure_happens_once() {
        let api = InMemoryTaskApi::new(UserId::new(1));
        api.fail_next(TaskOp::List, ApiError::status(500, None));

        assert!(api.list().await.is_err());
        assert!(api.list().await.is_ok());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let api = InMemoryTaskApi::new(UserId::new(1));
        let err = api.delete(TaskId::new(3)).await.unwrap_err();
        assert_eq!(err.status_code, Some(404));
        let err = api
            .update(TaskId::new(3), &TaskPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code, Some(404));
    }

    #[tokio::test]
    async fn empty_description_clears_it() {
        let api = InMemoryTaskApi::new(UserId::new(1));
        let created = api
            .create(&NewTask::new("a").with_description("notes"))
            .await
            .unwrap();
        assert_eq!(created.description.as_deref(), Some("notes"));

        let patch = TaskPatch {
            description: Some(String::new()),
            ..TaskPatch::default()
        };
        let updated = api.update(created.id, &patch).await.unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.title, "a");
    }
}
