//! Explicit connectivity observation.
//!
//! The platform's online/offline signal is fed into a `ConnectivityWatch`
//! by whatever embeds the services (the app shell, or a test). Everything
//! downstream reads the flag or subscribes to transitions through this one
//! object. There is no ambient global to consult, which is what makes
//! forced-offline and flapping scenarios deterministic in tests.

use tokio::sync::watch;
use tracing::info;

/// Shared, cloneable connectivity flag with change notification.
#[derive(Clone)]
pub struct ConnectivityWatch {
    tx: watch::Sender<bool>,
}

impl ConnectivityWatch {
    /// Create with an explicit initial state.
    pub fn new(initial: bool) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Start in the online state.
    pub fn online() -> Self {
        Self::new(true)
    }

    /// Start in the offline state.
    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Current connectivity flag.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Feed a platform connectivity event. Repeated same-state events are
    /// swallowed; subscribers only see transitions.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
        if changed {
            info!(
                subsystem = "sync",
                component = "connectivity",
                online,
                "Connectivity changed"
            );
        }
    }

    /// Subscribe to connectivity transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for ConnectivityWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityWatch")
            .field("online", &self.is_online())
            .finish()
    }
}
