//! Shared selection state for all linked views.
//!
//! One [`SelectionStore`] exists per dashboard session. It is the single
//! writer of the two per-group key sets; every view holds a read-only
//! reference and observes changes through [`SelectionStore::subscribe`].
//! Notification is synchronous and ordered by subscription, and completes
//! before the `set_selection` call that caused it returns — a view reading
//! [`SelectionStore::selection`] right after a write always sees the new
//! value.

use std::collections::BTreeSet;
use std::fmt;

use crate::data::Group;

/// Handle returned by [`SelectionStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(Group, &BTreeSet<String>)>;

/// Reactive store holding the two independent selection sets.
#[derive(Default)]
pub struct SelectionStore {
    selected: [BTreeSet<String>; 2],
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl SelectionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection set for one group.
    #[must_use]
    pub fn selection(&self, group: Group) -> &BTreeSet<String> {
        &self.selected[group.index()]
    }

    /// Replace one group's selection set.
    ///
    /// The input is deduplicated; insertion order is not meaningful. Every
    /// subscriber is notified, in subscription order, if and only if the
    /// group's contents actually changed — the notification completes before
    /// this call returns.
    pub fn set_selection(&mut self, group: Group, keys: impl IntoIterator<Item = String>) {
        let keys: BTreeSet<String> = keys.into_iter().collect();
        if self.selected[group.index()] == keys {
            return;
        }

        log::trace!("selection({group:?}) <- {} keys", keys.len());
        self.selected[group.index()] = keys;
        self.notify(group);
    }

    /// Add a key if absent, remove it if present (line-chart trace click).
    pub fn toggle(&mut self, group: Group, key: &str) {
        let mut keys = self.selected[group.index()].clone();
        if !keys.remove(key) {
            keys.insert(key.to_string());
        }
        self.set_selection(group, keys);
    }

    /// Clear one group's selection (the explicit "reset filters" action).
    pub fn clear(&mut self, group: Group) {
        self.set_selection(group, std::iter::empty::<String>());
    }

    /// Drop every key not present in `known`, notifying when any was dropped.
    ///
    /// Called on dataset swap so the invariant "a selection only ever holds
    /// keys of the current dataset" survives loading a new cohort. Returns
    /// the number of purged keys.
    pub fn retain_known(&mut self, group: Group, known: &BTreeSet<String>) -> usize {
        let kept: BTreeSet<String> =
            self.selected[group.index()].intersection(known).cloned().collect();
        let purged = self.selected[group.index()].len() - kept.len();
        if purged > 0 {
            log::debug!("selection({group:?}): purged {purged} stale keys on dataset swap");
            self.set_selection(group, kept);
        }
        purged
    }

    /// Register a callback invoked after every content-changing write.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(Group, &BTreeSet<String>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, group: Group) {
        // Snapshot so subscribers observe a consistent value even if the
        // subscriber list is long.
        let snapshot = self.selected[group.index()].clone();
        for (_, callback) in &mut self.subscribers {
            callback(group, &snapshot);
        }
    }
}

impl fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore")
            .field("selected1", &self.selected[0].len())
            .field("selected2", &self.selected[1].len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
