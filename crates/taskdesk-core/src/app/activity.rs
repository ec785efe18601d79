//! Activity - ゲートウェイの「通信中」と「直前のエラー」
//!
//! フォームのスピナーとエラーバナーに使う。

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct Activity {
    in_flight: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl Activity {
    /// リクエスト開始（直前のエラーは消える）。guard を drop すると終了。
    pub fn begin(&self) -> InFlight<'_> {
        self.last_error.lock().take();
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight { activity: self }
    }

    pub fn fail(&self, message: impl Into<String>) {
        *self.last_error.lock() = Some(message.into());
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

pub struct InFlight<'a> {
    activity: &'a Activity,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.activity.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_tracks_loading_and_clears_error() {
        let activity = Activity::default();
        activity.fail("old");

        let guard = activity.begin();
        assert!(activity.is_loading());
        assert_eq!(activity.last_error(), None);

        activity.fail("new");
        drop(guard);
        assert!(!activity.is_loading());
        assert_eq!(activity.last_error().as_deref(), Some("new"));
    }
}
