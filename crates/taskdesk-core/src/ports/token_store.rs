//! TokenStore port - bearer token の保存先
//!
//! プロセスをまたいで残る key/value ストア。
//! 保存するのは固定キー `token` の生の文字列だけ。
//!
//! # 実装
//! - **InMemoryTokenStore**: テスト・一時利用
//! - **FileTokenStore**: JSON ファイル（ネイティブクライアント用）

use crate::domain::{BearerToken, StorageError};

/// token を保存するキー（キーが無い = ログアウト状態）
pub const TOKEN_KEY: &str = "token";

/// TokenStore は token の読み書きを明示的なメソッドで提供
///
/// # 設計原則
/// - グローバル状態にしない（SessionStore に注入する）
/// - 同期 I/O（読み書きは小さく、await を跨がない）
pub trait TokenStore: Send + Sync {
    /// 保存済みの token（無ければ `None`）
    fn load(&self) -> Result<Option<String>, StorageError>;

    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// 無い場合も成功扱い
    fn remove(&self) -> Result<(), StorageError>;
}

/// TokenSource はゲートウェイが token を読むための窓口（読み取り専用）
///
/// SessionStore が実装する。ゲートウェイは token を書き換えない。
pub trait TokenSource: Send + Sync {
    fn bearer(&self) -> Option<BearerToken>;
}

/// token を持たないクライアント用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn bearer(&self) -> Option<BearerToken> {
        None
    }
}
