//! AuthGateway - ログイン・登録・ログアウト
//!
//! # 学習ポイント
//! - login だけが Session を作る（register はアカウントを作るだけ）
//! - `ApiError` はここで利用者向けの `AuthError` に変換する
//! - フォーム経由の入口は検証に失敗したらネットワークに出ない

use std::sync::Arc;

use tracing::{debug, warn};

use super::activity::Activity;
use super::session::SessionStore;
use crate::domain::{
    AuthError, AuthOp, ClientError, Credentials, LoginForm, RegistrationForm, Session,
};
use crate::ports::{AuthApi, RegisterResponse};

pub struct AuthGateway {
    api: Arc<dyn AuthApi>,
    session: Arc<SessionStore>,
    activity: Activity,
}

impl AuthGateway {
    pub fn new(api: Arc<dyn AuthApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            activity: Activity::default(),
        }
    }

    /// 資格情報を token に交換し、Session を確立する
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Session, ClientError> {
        self.login_with(Credentials::new(email, password)).await
    }

    /// アカウントを作成する（ログインはしない）
    pub async fn register(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<RegisterResponse, ClientError> {
        self.register_with(Credentials::new(email, password)).await
    }

    pub async fn submit_login(&self, form: &LoginForm) -> Result<Session, ClientError> {
        let credentials = form.validate()?;
        self.login_with(credentials).await
    }

    pub async fn submit_registration(
        &self,
        form: &RegistrationForm,
    ) -> Result<RegisterResponse, ClientError> {
        let credentials = form.validate()?;
        self.register_with(credentials).await
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()?;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.activity.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.activity.last_error()
    }

    async fn login_with(&self, credentials: Credentials) -> Result<Session, ClientError> {
        let _busy = self.activity.begin();
        debug!(email = %credentials.email, "signing in");

        let response = self
            .api
            .login(&credentials)
            .await
            .map_err(|err| self.reject(AuthError::from_api(AuthOp::Login, &err)))?;

        self.session
            .set_from_token(&response.access_token)
            .inspect_err(|err| self.activity.fail(err.to_string()))
    }

    async fn register_with(
        &self,
        credentials: Credentials,
    ) -> Result<RegisterResponse, ClientError> {
        let _busy = self.activity.begin();
        debug!(email = %credentials.email, "registering");

        self.api
            .register(&credentials)
            .await
            .map_err(|err| self.reject(AuthError::from_api(AuthOp::Register, &err)))
    }

    fn reject(&self, err: AuthError) -> ClientError {
        warn!(op = ?err.op, status = ?err.status_code, "{}", err.message);
        self.activity.fail(err.message.clone());
        err.into()
    }
}
