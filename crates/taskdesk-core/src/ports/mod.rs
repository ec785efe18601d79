//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（認証サービス、タスクサービス、token の保存先）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - サーバーが正本（source of truth）
//! - クライアントはサーバーが確定した値だけを保持する
//! - テストでは impls の in-memory 実装に差し替える

pub mod auth_api;
pub mod task_api;
pub mod token_store;

pub use self::auth_api::{AuthApi, LoginResponse, RegisterResponse};
pub use self::task_api::TaskApi;
pub use self::token_store::{NoToken, TOKEN_KEY, TokenSource, TokenStore};
