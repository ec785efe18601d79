//! Session - トークンから導出されるログイン中のユーザー
//!
//! # 学習ポイント
//! - 署名検証はしない（権限の正本はサーバー）
//! - decode 失敗は panic ではなく `Result` で返す
//! - base64 は standard / URL-safe のどちらの alphabet でも受け付ける

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

use super::errors::TokenError;
use super::ids::UserId;

/// padding の有無を問わない standard alphabet の engine
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Bearer token（不透明な文字列）
///
/// Debug では中身を出さない（ログに token を残さないため）。
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// `Authorization` ヘッダの値
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// payload（2 番目のセグメント）を decode して Session を得る
    ///
    /// # エラー
    /// - セグメントが 3 未満
    /// - base64 として不正
    /// - JSON として不正、または `userId` / `email` が無い
    pub fn decode(&self) -> Result<Session, TokenError> {
        let segments: Vec<&str> = self.0.split('.').collect();
        if segments.len() < 3 {
            return Err(TokenError::Segments(segments.len()));
        }

        // URL-safe alphabet を standard に寄せてから decode
        let normalized: String = segments[1]
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        let bytes = PAYLOAD_ENGINE
            .decode(normalized.as_bytes())
            .map_err(|e| TokenError::Base64(e.to_string()))?;

        let claims: TokenClaims =
            serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

        Ok(Session {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// token payload のうちクライアントが使う部分
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(rename = "userId")]
    user_id: UserId,
    email: String,
}

/// 現在ログイン中のユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub email: String,
}
