//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてクライアントのロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ClientBuilder**: クライアントの構築とワイヤリング
//! - **SessionStore**: token の保存と Session の導出
//! - **AuthGateway**: ログイン・登録・ログアウト
//! - **TaskGateway**: タスク CRUD（キャンセル可能）
//! - **TaskListMachine**: サーバーが確定した一覧の状態機械

mod activity;
pub mod auth;
pub mod builder;
pub mod session;
pub mod task_list;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing;

// 主要な型を再エクスポート
pub use self::auth::AuthGateway;
pub use self::builder::{BuildError, Client, ClientBuilder};
pub use self::session::SessionStore;
pub use self::task_list::{Commit, TaskListMachine};
pub use self::tasks::TaskGateway;
