//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpAuthApi / HttpTaskApi**: reqwest による本番用
//! - **InMemoryAuthApi / InMemoryTaskApi**: 開発用・テスト用のサーバー代わり
//! - **FileTokenStore**: JSON ファイルに token を保存
//! - **InMemoryTokenStore**: プロセス内だけに token を保持

pub mod file_token_store;
pub mod http;
pub mod memory_api;
pub mod memory_token_store;

// 主要な型を再エクスポート
pub use self::file_token_store::FileTokenStore;
pub use self::http::{HttpAuthApi, HttpTaskApi};
pub use self::memory_api::{InMemoryAuthApi, InMemoryTaskApi, unsigned_token};
pub use self::memory_token_store::InMemoryTokenStore;
