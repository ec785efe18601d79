//! SessionStore - ログイン中のユーザーと token の正本
//!
//! # 学習ポイント
//! - token は TokenStore（注入）に保存し、Session はそこから導出する
//! - `set_from_token` は「decode → 保存 → 差し替え」の順。decode に失敗したら何も変えない
//! - 変更は `watch` で購読できる（画面側の再描画用）
//!
//! # 使用例
//! ```ignore
//! let store = SessionStore::restore(Arc::new(FileTokenStore::new(path)));
//! if let Some(session) = store.session() {
//!     println!("signed in as {}", session.email);
//! }
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{BearerToken, ClientError, Session, StorageError};
use crate::ports::{TokenSource, TokenStore};

#[derive(Debug, Clone)]
struct Active {
    token: BearerToken,
    session: Session,
}

pub struct SessionStore {
    storage: Arc<dyn TokenStore>,
    active: RwLock<Option<Active>>,
    changes: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// 保存済みの token から Session を復元する
    ///
    /// decode できない token はログアウト扱いにして保存先から消す。
    /// 保存先が読めない場合もログアウト扱い（起動は止めない）。
    pub fn restore(storage: Arc<dyn TokenStore>) -> Self {
        let active = match storage.load() {
            Ok(Some(raw)) => {
                let token = BearerToken::new(raw);
                match token.decode() {
                    Ok(session) => {
                        debug!(user_id = %session.user_id, "session restored");
                        Some(Active { token, session })
                    }
                    Err(err) => {
                        warn!(error = %err, "discarding stored token");
                        if let Err(err) = storage.remove() {
                            warn!(error = %err, "failed to remove stored token");
                        }
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "token storage unreadable; starting signed out");
                None
            }
        };

        let (changes, _) = watch::channel(active.as_ref().map(|a| a.session.clone()));
        Self {
            storage,
            active: RwLock::new(active),
            changes,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.active.read().as_ref().map(|a| a.session.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.active.read().is_some()
    }

    /// token を decode して保存し、Session を差し替える
    pub fn set_from_token(&self, raw: &str) -> Result<Session, ClientError> {
        let token = BearerToken::new(raw);
        let session = token.decode()?;

        self.storage.save(token.as_str())?;
        *self.active.write() = Some(Active {
            token,
            session: session.clone(),
        });
        self.changes.send_replace(Some(session.clone()));

        debug!(user_id = %session.user_id, "session established");
        Ok(session)
    }

    /// token を消してログアウトする（ネットワーク呼び出しなし）
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove()?;
        *self.active.write() = None;
        self.changes.send_replace(None);
        debug!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<BearerToken> {
        self.active.read().as_ref().map(|a| a.token.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.changes.subscribe()
    }
}

impl TokenSource for SessionStore {
    fn bearer(&self) -> Option<BearerToken> {
        self.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, UserId};
    use crate::impls::{InMemoryTokenStore, unsigned_token};
    use crate::ports::TOKEN_KEY;

    const REFERENCE: &str = "h.eyJ1c2VySWQiOjEsImVtYWlsIjoiYUBiLmNvbSJ9.s";

    fn reference_session() -> Session {
        Session {
            user_id: UserId::new(1),
            email: "a@b.com".into(),
        }
    }

    #[test]
    fn starts_signed_out_without_token() {
        let store = SessionStore::restore(Arc::new(InMemoryTokenStore::new()));
        assert_eq!(store.session(), None);
        assert!(store.token().is_none());
    }

    #[test]
    fn restores_session_from_stored_token() {
        let storage = Arc::new(InMemoryTokenStore::with_token(REFERENCE));
        let store = SessionStore::restore(storage);

        assert_eq!(store.session(), Some(reference_session()));
        assert_eq!(store.bearer().unwrap().as_str(), REFERENCE);
    }

    #[test]
    fn undecodable_stored_token_is_discarded() {
        let storage = Arc::new(InMemoryTokenStore::with_token("not-a-token"));
        let store = SessionStore::restore(storage.clone());

        assert!(!store.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn set_from_token_persists_and_replaces() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::restore(storage.clone());
        let mut changes = store.subscribe();

        let session = store.set_from_token(REFERENCE).unwrap();
        assert_eq!(session, reference_session());
        assert_eq!(storage.load().unwrap().as_deref(), Some(REFERENCE));
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), Some(reference_session()));

        let other = unsigned_token(UserId::new(2), "c@d.com");
        let session = store.set_from_token(&other).unwrap();
        assert_eq!(session.user_id, UserId::new(2));
        assert_eq!(storage.load().unwrap(), Some(other));
    }

    #[test]
    fn malformed_token_changes_nothing() {
        let storage = Arc::new(InMemoryTokenStore::with_token(REFERENCE));
        let store = SessionStore::restore(storage.clone());

        let err = store.set_from_token("only.two").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedToken);
        assert_eq!(store.session(), Some(reference_session()));
        assert_eq!(storage.load().unwrap().as_deref(), Some(REFERENCE));
    }

    #[test]
    fn clear_removes_token_key() {
        let storage = Arc::new(InMemoryTokenStore::with_token(REFERENCE));
        let store = SessionStore::restore(storage.clone());

        store.clear().unwrap();
        assert_eq!(store.session(), None);
        assert_eq!(storage.load().unwrap(), None, "{TOKEN_KEY} should be gone");

        // 2 回目も成功
        store.clear().unwrap();
    }
}
