use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle states the client worker moves through.
///
/// `Inactive` is both the pre-start and the terminal state; the worker
/// task returns once it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Inactive,
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
}

/// Boolean flags shared between the worker task and the reconnect
/// coordinator.
///
/// Each flag's transitions are independently meaningful, so plain atomic
/// load/store is enough; the start/stop guards additionally use
/// compare-and-swap so exactly one caller wins a transition.
#[derive(Debug, Default)]
pub(crate) struct ClientFlags {
    active: AtomicBool,
    connected: AtomicBool,
    welcome_received: AtomicBool,
    reconnect_required: AtomicBool,
    stop_requested: AtomicBool,
}

impl ClientFlags {
    /// Flips `active` false -> true. Returns false if the client was
    /// already active.
    pub fn set_active(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Flips `active` true -> false. Returns false if the client was not
    /// active.
    pub fn set_inactive(&self) -> bool {
        self.active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn set_connected(&self) {
        self.connected.store(true, Ordering::Release);
    }

    pub fn set_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_welcome_received(&self) {
        self.welcome_received.store(true, Ordering::Release);
    }

    pub fn clear_welcome_received(&self) {
        self.welcome_received.store(false, Ordering::Release);
    }

    pub fn welcome_received(&self) -> bool {
        self.welcome_received.load(Ordering::Acquire)
    }

    pub fn require_reconnect(&self) {
        self.reconnect_required.store(true, Ordering::Release);
    }

    /// Consumes the reconnect-required flag. Returns true for exactly one
    /// caller per reconnect frame.
    pub fn take_reconnect_required(&self) -> bool {
        self.reconnect_required
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn reset_stop(&self) {
        self.stop_requested.store(false, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}
