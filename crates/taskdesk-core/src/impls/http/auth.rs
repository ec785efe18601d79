//! HttpAuthApi - 認証サービスの HTTP 実装

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use super::RestClient;
use crate::domain::{ApiError, Credentials};
use crate::ports::{AuthApi, LoginResponse, RegisterResponse, TokenSource};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";

#[derive(Clone)]
pub struct HttpAuthApi {
    rest: RestClient,
}

impl HttpAuthApi {
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
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.rest.request(Method::POST, LOGIN_PATH).json(credentials);
        self.rest.send_json(request).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        let request = self
            .rest
            .request(Method::POST, REGISTER_PATH)
            .json(credentials);
        self.rest.send_json(request).await
    }
}
