//! Event subscription ledger — which event kinds trigger a sync round-trip.
//!
//! DESIGN
//! ======
//! Each component carries a `SyncKinds` set in its core. The page answers
//! `is_subscribed(component_id, kind)` with an O(1) id lookup followed by a
//! membership test. No ordering or priority between kinds; iteration is in
//! wire-code order only so rendered client configs are deterministic.
//!
//! Upload and structured-value widgets declare `SyncPolicy::Always`: a file
//! selection or structured edit is accepted whatever kind it arrives with.

use std::collections::BTreeSet;

use crate::event::EventKind;

/// Set of event kinds a component reports to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncKinds(BTreeSet<EventKind>);

impl SyncKinds {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn add(&mut self, kinds: &[EventKind]) {
        self.0.extend(kinds.iter().copied());
    }

    pub fn remove(&mut self, kinds: &[EventKind]) {
        for kind in kinds {
            self.0.remove(kind);
        }
    }

    #[must_use]
    pub fn contains(&self, kind: EventKind) -> bool {
        self.0.contains(&kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Kinds in wire-code order.
    pub fn iter(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.0.iter().copied()
    }

    /// Wire codes in ascending order, as embedded in client configs.
    #[must_use]
    pub fn codes(&self) -> Vec<u8> {
        self.iter().map(EventKind::code).collect()
    }
}

impl FromIterator<EventKind> for SyncKinds {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How a widget gates incoming notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Only subscribed kinds mutate state; others are ignored silently.
    Subscribed,
    /// Every notification is accepted regardless of its kind.
    Always,
}

impl SyncPolicy {
    /// Whether a notification of `kind` may mutate a component with `kinds`.
    #[must_use]
    pub fn admits(self, kinds: &SyncKinds, kind: EventKind) -> bool {
        match self {
            Self::Subscribed => kinds.contains(kind),
            Self::Always => true,
        }
    }
}

#[cfg(test)]
#[path = "subscription_test.rs"]
mod tests;
