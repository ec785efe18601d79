//! HttpTaskApi - タスクサービスの HTTP 実装

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use super::RestClient;
use crate::domain::{ApiError, NewTask, Task, TaskId, TaskPatch};
use crate::ports::{TaskApi, TokenSource};

pub const TASKS_PATH: &str = "/tasks";

fn task_path(id: TaskId) -> String {
    format!("{TASKS_PATH}/{}", id.get())
}

#[derive(Clone)]
pub struct HttpTaskApi {
    rest: RestClient,
}

impl HttpTaskApi {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            rest: RestClient::new(http, base_url, tokens),
        }
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let request = self.rest.request(Method::GET, TASKS_PATH);
        self.rest.send_json(request).await
    }

    async fn create(&self, fields: &NewTask) -> Result<Task, ApiError> {
        let request = self.rest.request(Method::POST, TASKS_PATH).json(fields);
        self.rest.send_json(request).await
    }

    async fn update(&self, id: TaskId, fields: &TaskPatch) -> Result<Task, ApiError> {
        let request = self.rest.request(Method::PUT, &task_path(id)).json(fields);
        self.rest.send_json(request).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let request = self.rest.request(Method::DELETE, &task_path(id));
        self.rest.send_empty(request).await
    }
}
