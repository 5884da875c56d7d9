//! Connection liveness tracking.
//!
//! Every successfully handled welcome, keepalive, notification or
//! revocation frame counts as a liveness signal. A connection with no
//! signal inside the adjusted keepalive window is considered dead and torn
//! down for reconnection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// The server-declared keepalive interval is stretched by this margin
/// before arming the local timer, absorbing delivery jitter.
const KEEPALIVE_MARGIN_PERCENT: u64 = 80;

/// Tracks the negotiated keepalive window and the last time a frame was
/// heard.
///
/// Timestamps are stored as milliseconds since an internal epoch so both
/// the worker task and the reconnect coordinator can touch the tracker
/// through plain atomic operations.
pub struct LivenessTracker {
    /// Epoch for converting `Instant` readings to u64 milliseconds.
    epoch: Instant,
    /// Adjusted keepalive window (ms).
    keepalive_timeout_ms: AtomicU64,
    /// Last frame heard (ms since epoch). 0 means nothing heard yet.
    last_heard_ms: AtomicU64,
}

impl LivenessTracker {
    /// Creates a tracker armed with `default_timeout` until a welcome
    /// negotiates the real window.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            keepalive_timeout_ms: AtomicU64::new(default_timeout.as_millis() as u64),
            last_heard_ms: AtomicU64::new(0),
        }
    }

    /// Arms the timer from the server-declared keepalive interval.
    ///
    /// The stored window is `seconds * 100 / 80` (integer floor), so the
    /// local alarm allows 25% more slack than the server's nominal
    /// interval before declaring the connection dead.
    pub fn set_timeout_from_negotiated(&self, seconds: u64) {
        let adjusted = adjusted_keepalive_secs(seconds);
        self.keepalive_timeout_ms
            .store(adjusted * 1_000, Ordering::Release);
    }

    /// The currently armed keepalive window.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.keepalive_timeout_ms.load(Ordering::Acquire))
    }

    /// Records a liveness signal at the current instant.
    pub fn record_heard(&self) {
        let now_ms = self.epoch.elapsed().as_millis() as u64;
        self.last_heard_ms.store(now_ms, Ordering::Release);
    }

    /// Whether a signal was heard inside the armed window.
    ///
    /// Vacuously true before the first `record_heard`; the caller gates
    /// the check on the welcome handshake having completed.
    pub fn is_alive(&self) -> bool {
        let last_ms = self.last_heard_ms.load(Ordering::Acquire);
        if last_ms == 0 {
            return true;
        }

        let now_ms = self.epoch.elapsed().as_millis() as u64;
        now_ms < last_ms + self.keepalive_timeout_ms.load(Ordering::Acquire)
    }

    /// Forgets the last-heard timestamp. Called on disconnect cleanup; the
    /// armed window is left for the next welcome to overwrite.
    pub fn reset(&self) {
        self.last_heard_ms.store(0, Ordering::Release);
    }
}

fn adjusted_keepalive_secs(seconds: u64) -> u64 {
    seconds * 100 / KEEPALIVE_MARGIN_PERCENT
}
