// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot no-response watchdog.
//!
//! Arming spawns a task that sleeps for the deadline and then runs the
//! callback, unless its [`CancellationToken`] is cancelled first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Deadline after which a live call without a termination signal is flagged.
pub const DEFAULT_NO_RESPONSE_TIMEOUT: Duration = Duration::from_millis(30_000);

/// A cancellable one-shot deadline.
#[derive(Debug, Default)]
pub struct Watchdog {
    token: Option<CancellationToken>,
    fired: Arc<AtomicBool>,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `on_fire` after `delay`. Re-arming cancels the previous deadline.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let fired = Arc::new(AtomicBool::new(false));
        self.fired = Arc::clone(&fired);
        self.token = Some(token.clone());

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    fired.store(true, Ordering::SeqCst);
                    on_fire();
                }
            }
        });
    }

    /// Cancels the pending deadline. Safe to call any number of times,
    /// including after the deadline has fired.
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.token.is_some() && !self.has_fired()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn fires_after_deadline() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut watchdog = Watchdog::new();
        watchdog.arm(Duration::from_secs(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(watchdog.is_armed());

        tokio::time::sleep(Duration::from_millis(29_999)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(watchdog.has_fired());
        assert!(!watchdog.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut watchdog = Watchdog::new();
        watchdog.arm(Duration::from_secs(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        watchdog.cancel();
        watchdog.cancel();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!watchdog.is_armed());
        assert!(!watchdog.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fire_is_harmless() {
        let mut watchdog = Watchdog::new();
        watchdog.arm(Duration::from_millis(10), || {});
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(watchdog.has_fired());
        watchdog.cancel();
        watchdog.cancel();
        assert!(watchdog.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_previous_deadline() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut watchdog = Watchdog::new();

        let first = Arc::clone(&hits);
        watchdog.arm(Duration::from_secs(5), move || {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = Arc::clone(&hits);
        watchdog.arm(Duration::from_secs(10), move || {
            second.fetch_add(10, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn cancel_without_arm_is_noop() {
        let mut watchdog = Watchdog::new();
        watchdog.cancel();
        assert!(!watchdog.is_armed());
    }
}
