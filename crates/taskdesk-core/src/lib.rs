//! taskdesk-core
//!
//! タスク管理クライアントのセッションとタスク一覧同期の中核。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, session, forms, state, errors）
//! - **ports**: 抽象化レイヤー（AuthApi, TaskApi, TokenStore, TokenSource）
//! - **impls**: 実装（reqwest の HTTP クライアント、token ファイル、in-memory 版）
//! - **app**: アプリケーションロジック（builder, session, auth, tasks, task_list）
//! - **config**: 接続先と token 保存先の設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Client, ClientBuilder, Commit, TaskListMachine};
pub use config::Settings;
pub use domain::ClientError;
