// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Elapsed call timer.
//!
//! The timer itself does not tick; the controller samples it on every
//! interval tick and renders the `mm:ss` label. Every method takes the
//! current instant so the timer stays deterministic under test.

use std::time::Duration;

use tokio::time::Instant;

/// Tracks how long the current call has been running.
#[derive(Debug, Clone, Default)]
pub struct ElapsedTimer {
    running_since: Option<Instant>,
    accumulated: Duration,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to zero and starts running.
    pub fn start(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        self.running_since = Some(now);
    }

    /// Continues from the frozen value. No-op while running.
    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stops and freezes the current value. No-op when already stopped.
    pub fn stop(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        self.accumulated + running
    }

    /// Replaces the measured value, e.g. with the duration reported by the dialer.
    pub fn override_elapsed(&mut self, elapsed: Duration, now: Instant) {
        self.accumulated = elapsed;
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }

    pub fn label(&self, now: Instant) -> String {
        format_elapsed(self.elapsed(now))
    }
}

/// Formats a duration as `mm:ss`. Minutes are not wrapped at the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
