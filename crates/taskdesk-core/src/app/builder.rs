//! ClientBuilder - クライアントの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: 不正な URL は最初のリクエストではなく build() で弾く
//! - ports の差し替え（テストでは in-memory 実装を注入する）

use std::sync::Arc;

use reqwest::Url;

use super::auth::AuthGateway;
use super::session::SessionStore;
use super::task_list::TaskListMachine;
use super::tasks::TaskGateway;
use crate::config::{DEFAULT_AUTH_BASE_URL, Settings, TASK_SERVICE_BASE_URL};
use crate::domain::ClientError;
use crate::impls::{FileTokenStore, HttpAuthApi, HttpTaskApi, InMemoryTokenStore};
use crate::ports::{AuthApi, TaskApi, TokenSource, TokenStore};

/// ClientBuilder はクライアントを構築
///
/// # 使用例
/// ```ignore
/// let client = ClientBuilder::from_settings(&Settings::load()?).build()?;
/// let session = client.auth().login("a@b.com", "secret").await?;
/// ```
///
/// # Fail-fast 設計
/// - HTTP 実装を使う場合、base URL を build() 時に解析する
/// - 解析できなければ BuildError を返す
pub struct ClientBuilder {
    auth_base_url: String,
    task_base_url: String,
    token_store: Option<Arc<dyn TokenStore>>,
    http: Option<reqwest::Client>,
    auth_api: Option<Arc<dyn AuthApi>>,
    task_api: Option<Arc<dyn TaskApi>>,
}

/// BuildError はクライアント構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid {service} base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        service: &'static str,
        url: String,
        reason: String,
    },
}

fn check_base_url(service: &'static str, url: &str) -> Result<(), BuildError> {
    let invalid = |reason: String| BuildError::InvalidBaseUrl {
        service,
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

impl ClientBuilder {
    /// 既定の接続先・メモリ上の token で作成
    pub fn new() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            task_base_url: TASK_SERVICE_BASE_URL.to_string(),
            token_store: None,
            http: None,
            auth_api: None,
            task_api: None,
        }
    }

    /// 設定の認証 URL と token ファイルを使う
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .auth_base_url(&settings.auth.base_url)
            .token_store(Arc::new(FileTokenStore::new(&settings.storage.token_path)))
    }

    pub fn auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    /// タスクサービスの URL（テスト用の差し替え口）
    pub fn task_base_url(mut self, url: impl Into<String>) -> Self {
        self.task_base_url = url.into();
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn auth_api(mut self, api: Arc<dyn AuthApi>) -> Self {
        self.auth_api = Some(api);
        self
    }

    pub fn task_api(mut self, api: Arc<dyn TaskApi>) -> Self {
        self.task_api = Some(api);
        self
    }

    /// ClientBuilder を構築して Client を生成
    ///
    /// # 検証
    /// - HTTP 実装を使うサービスの base URL が http(s) の URL であること
    pub fn build(self) -> Result<Client, BuildError> {
        if self.auth_api.is_none() {
            check_base_url("auth", &self.auth_base_url)?;
        }
        if self.task_api.is_none() {
            check_base_url("task", &self.task_base_url)?;
        }

        let storage = self
            .token_store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));
        let session = Arc::new(SessionStore::restore(storage));
        let tokens: Arc<dyn TokenSource> = session.clone();
        let http = self.http.unwrap_or_default();

        let auth_api = self.auth_api.unwrap_or_else(|| {
            Arc::new(HttpAuthApi::new(
                http.clone(),
                self.auth_base_url,
                tokens.clone(),
            ))
        });
        let task_api = self
            .task_api
            .unwrap_or_else(|| Arc::new(HttpTaskApi::new(http, self.task_base_url, tokens)));

        Ok(Client {
            auth: AuthGateway::new(auth_api, session.clone()),
            tasks: Arc::new(TaskGateway::new(task_api)),
            session,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client は SessionStore と 2 つのゲートウェイを束ねる
pub struct Client {
    session: Arc<SessionStore>,
    auth: AuthGateway,
    tasks: Arc<TaskGateway>,
}

impl Client {
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn auth(&self) -> &AuthGateway {
        &self.auth
    }

    pub fn tasks(&self) -> &TaskGateway {
        &self.tasks
    }

    /// 一覧画面のマウント（Loading で始まる。`load()` は呼び出し側が行う）
    pub fn task_list(&self) -> TaskListMachine {
        TaskListMachine::new(self.tasks.clone())
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.auth.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTask, UserId};
    use crate::impls::{InMemoryAuthApi, InMemoryTaskApi};
    use rstest::rstest;

    #[rstest]
    #[case::not_a_url("localhost:3000")]
    #[case::relative("/auth")]
    #[case::wrong_scheme("ftp://localhost:3000")]
    fn rejects_bad_auth_url(#[case] url: &str) {
        let result = ClientBuilder::new().auth_base_url(url).build();
        assert!(matches!(
            result,
            Err(BuildError::InvalidBaseUrl { service: "auth", .. })
        ));
    }

    #[test]
    fn injected_api_skips_url_check() {
        let result = ClientBuilder::new()
            .task_base_url("not a url")
            .task_api(Arc::new(InMemoryTaskApi::new(UserId::new(1))))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn defaults_build() {
        let client = ClientBuilder::default().build().unwrap();
        assert!(client.session().session().is_none());
    }

    #[tokio::test]
    async fn register_login_add_logout() {
        let client = ClientBuilder::new()
            .auth_api(Arc::new(InMemoryAuthApi::new()))
            .task_api(Arc::new(InMemoryTaskApi::new(UserId::new(1))))
            .build()
            .unwrap();

        client.auth().register("a@b.com", "secret").await.unwrap();
        assert!(client.session().session().is_none());

        let session = client.auth().login("a@b.com", "secret").await.unwrap();
        assert_eq!(client.session().session(), Some(session));

        let list = client.task_list();
        list.load().await.unwrap();
        list.add_task(NewTask::new("first")).await.unwrap();
        assert_eq!(list.snapshot().tasks.len(), 1);

        client.logout().unwrap();
        assert!(client.session().token().is_none());
    }

    const TOKEN: &str = "h.eyJ1c2VySWQiOjEsImVtYWlsIjoiYUBiLmNvbSJ9.s";

    #[tokio::test]
    async fn login_token_is_attached_to_task_requests() {
        use crate::impls::http::stub::StubServer;
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::{get, post};
        use axum::{Json, Router};
        use serde_json::{Value, json};

        let auth = StubServer::start(Router::new().route(
            "/auth/login",
            post(|| async { Json(json!({ "access_token": TOKEN })) }),
        ))
        .await;
        let tasks = StubServer::start(Router::new().route(
            "/tasks",
            get(|headers: HeaderMap| async move {
                let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
                if bearer != Some(format!("Bearer {TOKEN}").as_str()) {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })));
                }
                let body: Value = json!([{
                    "id": 5, "user_id": 1, "title": "X", "status": "pending",
                    "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"
                }]);
                (StatusCode::OK, Json(body))
            }),
        ))
        .await;

        let storage = Arc::new(InMemoryTokenStore::new());
        let client = ClientBuilder::new()
            .auth_base_url(auth.base_url())
            .task_base_url(tasks.base_url())
            .token_store(storage.clone())
            .build()
            .unwrap();

        // ログイン前は 401（特別扱いせず通常のエラー）
        let list = client.task_list();
        let err = list.load().await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        assert!(list.snapshot().tasks.is_empty());

        let session = client.auth().login("a@b.com", "secret").await.unwrap();
        assert_eq!(session.user_id, UserId::new(1));
        assert_eq!(storage.load().unwrap().as_deref(), Some(TOKEN));

        list.load().await.unwrap();
        assert_eq!(list.snapshot().tasks.len(), 1);
        assert_eq!(list.snapshot().tasks[0].id.get(), 5);
    }
}
