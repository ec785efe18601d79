//! AuthApi port - 認証サービス
//!
//! 実装は HTTP の詳細を隠し、失敗は `ApiError` に decode して返す。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ApiError, Credentials, UserId};

/// `POST /auth/login` の応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "access_token", alias = "accessToken")]
    pub access_token: String,
}

/// `POST /auth/register` の応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(rename = "user_id", alias = "userId")]
    pub user_id: UserId,

    #[serde(default)]
    pub message: String,
}

/// AuthApi は資格情報の交換とアカウント作成を行う
///
/// token の付与は実装側の責務（login/register には不要だが一律に付ける）。
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError>;
}
