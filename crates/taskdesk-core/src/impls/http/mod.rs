//! HTTP 実装（reqwest）
//!
//! # 学習ポイント
//! - リクエストごとに `TokenSource` から token を読んで `Authorization` に付与
//! - 失敗の形（status + body.message）はここで一度だけ `ApiError` に decode する
//! - 呼び出し側は reqwest の型を一切見ない

mod auth;
mod tasks;

#[cfg(test)]
pub(crate) mod stub;

pub use self::auth::HttpAuthApi;
pub use self::tasks::HttpTaskApi;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::ApiError;
use crate::ports::TokenSource;

/// エラー応答 body のうち読むのは `message` だけ
///
/// 文字列でも配列（バリデーションエラーの列挙）でも受け付ける。
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_string(self) -> String {
        match self {
            ErrorMessage::One(message) => message,
            ErrorMessage::Many(messages) => messages.join(", "),
        }
    }
}

/// base URL + token 付与 + エラー decode をまとめた薄いクライアント
#[derive(Clone)]
pub(crate) struct RestClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl RestClient {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// token があれば `Authorization: Bearer` を付ける
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "sending request");
        let builder = self.http.request(method, url);
        match self.tokens.bearer() {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.header_value()),
            None => builder,
        }
    }

    /// 送信して 2xx なら body を `T` に decode
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = Self::send(builder).await?;
        let status = response.status();
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, %status, "response body could not be decoded");
            ApiError::status(status.as_u16(), None)
        })
    }

    /// 送信して 2xx なら body は読まない（204 など）
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        Self::send(builder).await.map(|_| ())
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "request failed before a response arrived");
            ApiError::transport()
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(decode_error(status, response).await)
    }
}

async fn decode_error(status: StatusCode, response: Response) -> ApiError {
    let message = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .map(ErrorMessage::into_string),
        Err(e) => {
            warn!(error = %e, %status, "error body could not be read");
            None
        }
    };
    debug!(%status, ?message, "request rejected");
    ApiError::status(status.as_u16(), message)
}
