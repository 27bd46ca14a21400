//! Client list views that stay valid across mutations.
//!
//! Every mutation answers with a [`ViewEffect`]; applying it either patches
//! the list in place or marks it stale. Optimistic removals (e.g. dismissing
//! a feedback request before the server confirms) are explicit pending
//! entries: hidden from readers, restored on failure, and dropped for good
//! once the server confirms or the next full fetch lands.
use perfdesk_common::{Appraisal, Feedback, FeedbackRequest, Goal, ViewEffect};
use uuid::Uuid;

pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Goal {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Feedback {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for FeedbackRequest {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Appraisal {
    fn key(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Committed,
    PendingRemoval,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    state: EntryState,
}

#[derive(Debug, Clone)]
pub struct ListView<T> {
    entries: Vec<Entry<T>>,
    stale: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            stale: true,
        }
    }
}

impl<T: Keyed> ListView<T> {
    pub fn from_fetch(items: impl IntoIterator<Item = T>) -> Self {
        let mut view = Self::default();
        view.reconcile(items);
        view
    }

    /// Replace the contents with a fresh server listing. Pending entries are
    /// resolved by whatever the server now says.
    pub fn reconcile(&mut self, items: impl IntoIterator<Item = T>) {
        self.entries = items
            .into_iter()
            .map(|item| Entry {
                item,
                state: EntryState::Committed,
            })
            .collect();
        self.stale = false;
    }

    /// Items a reader should see.
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(|entry| entry.state == EntryState::Committed)
            .map(|entry| &entry.item)
    }

    pub fn visible_keys(&self) -> Vec<Uuid> {
        self.visible().map(Keyed::key).collect()
    }

    pub fn state_of(&self, key: Uuid) -> Option<EntryState> {
        self.position(key).map(|index| self.entries[index].state)
    }

    /// A refetch is required before the next read is trustworthy.
    pub fn needs_refetch(&self) -> bool {
        self.stale
    }

    pub fn begin_remove(&mut self, key: Uuid) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries[index].state = EntryState::PendingRemoval;
                true
            }
            None => false,
        }
    }

    pub fn confirm_remove(&mut self, key: Uuid) {
        self.entries
            .retain(|entry| !(entry.item.key() == key && entry.state == EntryState::PendingRemoval));
    }

    /// Server rejected the removal: the entry becomes visible again.
    pub fn rollback_remove(&mut self, key: Uuid) {
        if let Some(index) = self.position(key) {
            self.entries[index].state = EntryState::Committed;
        }
    }

    /// Apply the effect a mutation reported. `item` is the record the server
    /// returned, when it returned one.
    pub fn apply(&mut self, effect: ViewEffect, item: Option<T>) {
        match (effect, item) {
            (ViewEffect::InsertLocal, Some(item)) => {
                if let Some(index) = self.position(item.key()) {
                    self.entries[index] = Entry {
                        item,
                        state: EntryState::Committed,
                    };
                } else {
                    self.entries.push(Entry {
                        item,
                        state: EntryState::Committed,
                    });
                }
            }
            (ViewEffect::ReplaceLocal, Some(item)) => match self.position(item.key()) {
                Some(index) => {
                    self.entries[index] = Entry {
                        item,
                        state: EntryState::Committed,
                    };
                }
                None => self.stale = true,
            },
            (ViewEffect::RemoveLocal, Some(item)) => {
                let key = item.key();
                self.entries.retain(|entry| entry.item.key() != key);
            }
            _ => self.stale = true,
        }
    }

    fn position(&self, key: Uuid) -> Option<usize> {
        self.entries.iter().position(|entry| entry.item.key() == key)
    }
}
