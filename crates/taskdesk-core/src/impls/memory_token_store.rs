//! InMemoryTokenStore - プロセス内だけの token 保存先
//!
//! テストと「保存しない」モードで使う。

use parking_lot::Mutex;

use crate::domain::StorageError;
use crate::ports::TokenStore;

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// token が入った状態で作成（起動時の復元テスト用）
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.token.lock().take();
        Ok(())
    }
}
