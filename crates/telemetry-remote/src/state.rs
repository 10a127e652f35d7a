//! SSH connection lifecycle state machine.
//!
//! Legal transitions: `Disconnected -> Connecting -> {Connected, Disconnected}`,
//! `Connected -> Reconnecting`, `Reconnecting -> {Connected, Disconnected}`.
//! Enforced with a compare-and-swap on an `AtomicU8`; on every successful
//! transition the registered callback is invoked synchronously on the
//! caller's stack, so it must not block.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use telemetry_metrics::ConnectionState;

type StateChangeCallback = Box<dyn Fn(ConnectionState, ConnectionState) + Send + Sync>;

fn to_u8(state: ConnectionState) -> u8 {
    state as u8
}

fn from_u8(value: u8) -> ConnectionState {
    match value {
        1 => ConnectionState::Connecting,
        2 => ConnectionState::Connected,
        3 => ConnectionState::Reconnecting,
        _ => ConnectionState::Disconnected,
    }
}

/// Thread-safe connection state with a pluggable transition callback.
pub struct ConnectionStateMachine {
    state: AtomicU8,
    callback: RwLock<Option<StateChangeCallback>>,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(to_u8(ConnectionState::Disconnected)),
            callback: RwLock::new(None),
        }
    }

    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(ConnectionState, ConnectionState) + Send + Sync + 'static,
    {
        *self.callback.write() = Some(Box::new(callback));
    }

    pub fn current(&self) -> ConnectionState {
        from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Attempt the transition `from -> to`. Returns `true` if the state was
    /// exactly `from` and the swap succeeded.
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        let ok = self
            .state
            .compare_exchange(to_u8(from), to_u8(to), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if ok {
            if let Some(callback) = self.callback.read().as_ref() {
                callback(from, to);
            }
        }
        ok
    }

    /// Force the state regardless of the current value (used during
    /// construction/teardown where no prior state is guaranteed).
    pub fn force(&self, to: ConnectionState) {
        let from = self.current();
        self.state.store(to_u8(to), Ordering::SeqCst);
        if let Some(callback) = self.callback.read().as_ref() {
            callback(from, to);
        }
    }
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// A shared handle, cloned into background tasks that need to observe or
/// drive the state machine.
pub type SharedConnectionState = Arc<ConnectionStateMachine>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn starts_disconnected() {
        let sm = ConnectionStateMachine::new();
        assert_eq!(sm.current(), ConnectionState::Disconnected);
    }

    #[test]
    fn connect_sequence_passes_through_connecting() {
        let sm = ConnectionStateMachine::new();
        assert!(sm.transition(ConnectionState::Disconnected, ConnectionState::Connecting));
        assert_eq!(sm.current(), ConnectionState::Connecting);
        assert!(sm.transition(ConnectionState::Connecting, ConnectionState::Connected));
        assert_eq!(sm.current(), ConnectionState::Connected);
    }

    #[test]
    fn failed_dial_returns_to_disconnected() {
        let sm = ConnectionStateMachine::new();
        sm.transition(ConnectionState::Disconnected, ConnectionState::Connecting);
        assert!(sm.transition(ConnectionState::Connecting, ConnectionState::Disconnected));
        assert_eq!(sm.current(), ConnectionState::Disconnected);
    }

    #[test]
    fn transition_fails_from_the_wrong_state() {
        let sm = ConnectionStateMachine::new();
        assert!(!sm.transition(ConnectionState::Connected, ConnectionState::Reconnecting));
        assert_eq!(sm.current(), ConnectionState::Disconnected);
    }

    #[test]
    fn callback_fires_once_per_successful_transition() {
        let sm = ConnectionStateMachine::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        sm.on_change(move |_, _| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        sm.transition(ConnectionState::Disconnected, ConnectionState::Connecting);
        sm.transition(ConnectionState::Connected, ConnectionState::Reconnecting); // illegal, no-op
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
