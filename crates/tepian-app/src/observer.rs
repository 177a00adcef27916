//! Callback-based reactivity for frontends.
//!
//! Frontends register a [`CartObserver`] to re-render on change and to surface
//! warnings (a toast, a console line). Both methods default to no-ops.
//!
//! Notifications are delivered after the mutation that produced them has
//! finished, and [`crate::UiCart`] delivers them after releasing its lock, so
//! an observer may read the cart back through its own handle.

use crate::core::{CartOperation, CartSnapshot};
use std::fmt;
use std::sync::Arc;

/// Non-fatal conditions reported by the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartWarning {
    /// A guarded operation was attempted while revision mode is on.
    EditingSuspended {
        /// Operation that was ignored
        operation: CartOperation,
    },
    /// The in-memory cart changed but the storage write failed.
    PersistFailed {
        /// Rendered storage or encoding error
        reason: String,
    },
}

impl fmt::Display for CartWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EditingSuspended { operation } => {
                write!(f, "Cart editing is suspended in revision mode ({operation} ignored)")
            }
            Self::PersistFailed { reason } => write!(f, "Cart could not be saved: {reason}"),
        }
    }
}

/// Receives cart notifications.
pub trait CartObserver: Send + Sync {
    /// Called after every accepted mutation or mode change.
    fn on_cart_changed(&self, _snapshot: &CartSnapshot) {}

    /// Called for every [`CartWarning`].
    fn on_warning(&self, _warning: &CartWarning) {}
}

/// A notification recorded during a mutation, delivered once the mutation
/// has finished.
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Changed(CartSnapshot),
    Warning(CartWarning),
}

/// Notifications staged by a [`crate::CartCore`] mutation, together with the
/// observers they go to.
///
/// Holds no reference to the cart, so it can be dispatched after any lock
/// around the cart has been released.
#[must_use = "notifications are lost unless dispatched"]
pub struct PendingNotifications {
    observers: Vec<Arc<dyn CartObserver>>,
    events: Vec<Notification>,
}

impl PendingNotifications {
    pub(crate) fn new(observers: Vec<Arc<dyn CartObserver>>, events: Vec<Notification>) -> Self {
        Self { observers, events }
    }

    /// Whether there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() || self.observers.is_empty()
    }

    /// Deliver every staged notification, in order, to every observer.
    pub fn dispatch(self) {
        for event in &self.events {
            for observer in &self.observers {
                match event {
                    Notification::Changed(snapshot) => observer.on_cart_changed(snapshot),
                    Notification::Warning(warning) => observer.on_warning(warning),
                }
            }
        }
    }
}

impl fmt::Debug for PendingNotifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingNotifications")
            .field("observers", &self.observers.len())
            .field("events", &self.events)
            .finish()
    }
}
