//! Cart mode state machine.
//!
//! ```text
//!            set_revision_mode(true) / clear items
//!   Normal ─────────────────────────────────────────▶ Revision
//!          ◀─────────────────────────────────────────
//!            set_revision_mode(false) / (nothing)
//! ```
//!
//! Every item mutation except `clear_cart` is enabled only in `Normal`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current cart mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartMode {
    /// Editing enabled, changes mirrored to storage
    #[default]
    Normal,
    /// Editing suspended; the cart reads as empty and storage is left alone
    Revision,
}

/// Effect of a requested mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Requested mode equals the current one
    Stay,
    /// `Normal -> Revision`; items must be cleared
    EnterRevision,
    /// `Revision -> Normal`; no action
    ExitRevision,
}

impl CartMode {
    /// Mode for a revision flag.
    pub fn from_revision_flag(revision: bool) -> Self {
        if revision {
            Self::Revision
        } else {
            Self::Normal
        }
    }

    /// Whether this is [`CartMode::Revision`].
    pub fn is_revision(self) -> bool {
        matches!(self, Self::Revision)
    }

    /// Whether guarded mutations (`add`, `remove`, `update quantity`) may run.
    pub fn allows_editing(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Whether accepted mutations are written to storage.
    pub fn persists(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Classify a move from `self` to `next`.
    pub fn transition_to(self, next: CartMode) -> ModeTransition {
        match (self, next) {
            (Self::Normal, Self::Revision) => ModeTransition::EnterRevision,
            (Self::Revision, Self::Normal) => ModeTransition::ExitRevision,
            _ => ModeTransition::Stay,
        }
    }
}

impl fmt::Display for CartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Revision => write!(f, "revision"),
        }
    }
}
