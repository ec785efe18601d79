//! Domain identifiers (strongly-typed IDs).
//!
//! # サーバー採番の整数 ID + ジェネリック実装
//! Task と User の ID はどちらもサーバーが採番する整数です。
//! Phantom type パターンで共通実装を一つにまとめつつ、
//! `TaskId` と `UserId` をコンパイル時に区別します。
//!
//! ## ワイヤ表現
//! - JSON 上はただの整数（`#[serde(transparent)]`）
//! - Display はプレフィックス付き（"task-5", "user-1"）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"task-", "user-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let task_id = TaskId::new(5);
/// let user_id = UserId::new(5);
/// // 値は同じでも型が違うので混同できない
/// ```
#[repr(transparent)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: i64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// 内部の整数値を取得（URL 組み立てなど）
    pub const fn get(self) -> i64 {
        self.value
    }
}

// derive だと `T: Clone` などの境界が付いてしまうので手で実装する
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskMarker {}

impl IdMarker for TaskMarker {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// User のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserMarker {}

impl IdMarker for UserMarker {
    fn prefix() -> &'static str {
        "user-"
    }
}

/// Identifier of a Task (assigned by the task service).
pub type TaskId = Id<TaskMarker>;

/// Identifier of a User (assigned by the auth service).
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let task = TaskId::new(5);
        let user = UserId::new(5);

        assert_eq!(task.get(), user.get());
        assert_eq!(task.to_string(), "task-5");
        assert_eq!(user.to_string(), "user-5");

        // let _: TaskId = user; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let task = TaskId::new(42);
        assert_eq!(serde_json::to_string(&task).unwrap(), "42");

        let parsed: TaskId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<TaskId>(), size_of::<i64>());
        assert_eq!(size_of::<UserId>(), size_of::<i64>());
    }
}
