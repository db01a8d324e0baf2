//! Pending-write bookkeeping for the debounce scheduler.
//!
//! The map from write key to pending patch is the only owner of timer
//! handles: an entry leaves the map exactly once, either by its timer
//! firing (dispatch), by cancellation (entity deleted), or by the
//! teardown flush. At most one timer exists per key at any instant.

use std::collections::HashMap;
use tokio::task::JoinHandle;

use crate::models::{CommandPatch, LinkPatch, NotePatch, ProjectPatch};
use crate::remote::EntityKind;

/// Which field group of which entity a pending write targets.
///
/// One entry per key coalesces all edits to that group; a new edit merges
/// into the queued patch and restarts the key's quiet-period timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct WriteKey {
    pub id: String,
    pub group: WriteGroup,
}

/// The debounced field groups. Each entity kind has one free-text group;
/// discrete field changes bypass the scheduler entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum WriteGroup {
    ProjectText,
    NoteText,
    CommandText,
    LinkText,
}

impl WriteGroup {
    pub fn entity_kind(self) -> EntityKind {
        match self {
            WriteGroup::ProjectText => EntityKind::Project,
            WriteGroup::NoteText => EntityKind::Note,
            WriteGroup::CommandText => EntityKind::Command,
            WriteGroup::LinkText => EntityKind::Link,
        }
    }
}

/// A queued partial update, typed by entity kind.
#[derive(Debug, Clone)]
pub(crate) enum PendingPatch {
    Project(ProjectPatch),
    Note(NotePatch),
    Command(CommandPatch),
    Link(LinkPatch),
}

impl PendingPatch {
    /// Merge a later patch into this one, field-wise; later values win.
    /// Both sides of one key always carry the same variant.
    pub fn merge(&mut self, later: PendingPatch) {
        match (&mut *self, later) {
            (PendingPatch::Project(a), PendingPatch::Project(b)) => a.merge(b),
            (PendingPatch::Note(a), PendingPatch::Note(b)) => a.merge(b),
            (PendingPatch::Command(a), PendingPatch::Command(b)) => a.merge(b),
            (PendingPatch::Link(a), PendingPatch::Link(b)) => a.merge(b),
            (slot, later) => {
                debug_assert!(false, "patch kind mismatch under one write key");
                *slot = later;
            }
        }
    }

    /// Serialize for a self-contained one-way body.
    pub fn to_body(&self) -> serde_json::Value {
        let result = match self {
            PendingPatch::Project(p) => serde_json::to_value(p),
            PendingPatch::Note(p) => serde_json::to_value(p),
            PendingPatch::Command(p) => serde_json::to_value(p),
            PendingPatch::Link(p) => serde_json::to_value(p),
        };
        result.unwrap_or(serde_json::Value::Null)
    }
}

struct PendingWrite {
    patch: PendingPatch,
    /// Bumped on every merge; a timer only dispatches if its generation is
    /// still current, which closes the abort/fire race.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// The coalescing map described in the module docs.
#[derive(Default)]
pub(crate) struct PendingMap {
    entries: HashMap<WriteKey, PendingWrite>,
    next_generation: u64,
}

impl PendingMap {
    /// Merge a patch into the key's queued write (creating it if absent),
    /// cancel the key's running timer, and return the new generation the
    /// replacement timer must carry.
    pub fn merge(&mut self, key: WriteKey, patch: PendingPatch) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        match self.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                let pending = entry.get_mut();
                if let Some(timer) = pending.timer.take() {
                    timer.abort();
                }
                pending.patch.merge(patch);
                pending.generation = generation;
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(PendingWrite {
                    patch,
                    generation,
                    timer: None,
                });
            }
        }
        generation
    }

    /// Attach a freshly spawned timer to its entry. If the entry has moved
    /// on (newer edit, cancellation, flush), the timer is stale and gets
    /// aborted instead.
    pub fn arm(&mut self, key: &WriteKey, generation: u64, timer: JoinHandle<()>) {
        match self.entries.get_mut(key) {
            Some(pending) if pending.generation == generation => pending.timer = Some(timer),
            _ => timer.abort(),
        }
    }

    /// Remove and return the key's patch if `generation` is still current.
    /// Called by a firing timer; a stale generation means a newer edit
    /// restarted the quiet period and this firing must be ignored.
    pub fn take_if_current(&mut self, key: &WriteKey, generation: u64) -> Option<PendingPatch> {
        match self.entries.get(key) {
            Some(pending) if pending.generation == generation => {
                self.entries.remove(key).map(|p| p.patch)
            }
            _ => None,
        }
    }

    /// Drop every pending write for an entity and abort its timers.
    /// Returns how many keys were cancelled.
    pub fn cancel_entity(&mut self, id: &str) -> usize {
        let keys: Vec<WriteKey> = self
            .entries
            .keys()
            .filter(|k| k.id == id)
            .cloned()
            .collect();
        for key in &keys {
            if let Some(pending) = self.entries.remove(key) {
                if let Some(timer) = pending.timer {
                    timer.abort();
                }
            }
        }
        keys.len()
    }

    /// Drain everything for the teardown flush, aborting all timers.
    pub fn drain(&mut self) -> Vec<(WriteKey, PendingPatch)> {
        self.entries
            .drain()
            .map(|(key, mut pending)| {
                if let Some(timer) = pending.timer.take() {
                    timer.abort();
                }
                (key, pending.patch)
            })
            .collect()
    }

    /// Number of keys with a queued write.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_key(id: &str) -> WriteKey {
        WriteKey {
            id: id.to_string(),
            group: WriteGroup::NoteText,
        }
    }

    fn content(text: &str) -> PendingPatch {
        PendingPatch::Note(NotePatch {
            content: Some(text.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_merge_coalesces_under_one_key() {
        let mut map = PendingMap::default();
        let g1 = map.merge(note_key("nt-1"), content("a"));
        let g2 = map.merge(note_key("nt-1"), content("ab"));
        assert!(g2 > g1);
        assert_eq!(map.len(), 1);

        let taken = map.take_if_current(&note_key("nt-1"), g2).unwrap();
        match taken {
            PendingPatch::Note(p) => assert_eq!(p.content.as_deref(), Some("ab")),
            _ => panic!("wrong patch kind"),
        }
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_stale_generation_does_not_take() {
        let mut map = PendingMap::default();
        let g1 = map.merge(note_key("nt-1"), content("a"));
        let _g2 = map.merge(note_key("nt-1"), content("ab"));
        assert!(map.take_if_current(&note_key("nt-1"), g1).is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_cancel_entity_drops_queued_write() {
        let mut map = PendingMap::default();
        map.merge(note_key("nt-1"), content("a"));
        map.merge(note_key("nt-2"), content("b"));
        assert_eq!(map.cancel_entity("nt-1"), 1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.cancel_entity("nt-1"), 0);
    }

    #[test]
    fn test_drain_empties_map() {
        let mut map = PendingMap::default();
        map.merge(note_key("nt-1"), content("a"));
        map.merge(
            WriteKey {
                id: "cm-1".to_string(),
                group: WriteGroup::CommandText,
            },
            PendingPatch::Command(CommandPatch {
                command: Some("make".into()),
                ..Default::default()
            }),
        );
        let drained = map.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(map.len(), 0);
    }
}
