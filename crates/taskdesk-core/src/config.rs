//! Config - 接続先と token 保存先の設定
//!
//! 優先順位（後勝ち）:
//! 1. 既定値
//! 2. `taskdesk.toml`（無くてもよい）
//! 3. 環境変数 `TASKDESK_AUTH__BASE_URL` / `TASKDESK_STORAGE__TOKEN_PATH`
//!
//! タスクサービスの URL は設定できない（`TASK_SERVICE_BASE_URL` 固定）。
//! テストでは `ClientBuilder::task_base_url` で差し替える。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:3000";
pub const TASK_SERVICE_BASE_URL: &str = "http://localhost:3001";
pub const CONFIG_FILE: &str = "taskdesk.toml";
pub const ENV_PREFIX: &str = "TASKDESK";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageSettings {
    pub token_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub auth: AuthSettings,
    pub storage: StorageSettings,
}

/// `<config dir>/taskdesk/token.json`（config dir が無い環境ではカレント）
pub fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("taskdesk").join("token.json"))
        .unwrap_or_else(|| PathBuf::from(".taskdesk-token.json"))
}

impl Settings {
    /// カレントディレクトリの `taskdesk.toml` とプロセスの環境変数から読む
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(Path::new(CONFIG_FILE), None)
    }

    /// `env` が `Some` ならプロセスの環境変数の代わりに使う
    pub fn from_sources(
        file: &Path,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("auth.base_url", DEFAULT_AUTH_BASE_URL)?
            .set_default(
                "storage.token_path",
                default_token_path().to_string_lossy().into_owned(),
            )?
            .add_source(File::from(file).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth: AuthSettings {
                base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            },
            storage: StorageSettings {
                token_path: default_token_path(),
            },
        }
    }
}
