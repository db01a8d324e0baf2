//! The sync engine: optimistic mutation, debounced write coalescing,
//! reconciliation, and the teardown flush guard.
//!
//! Every entry point mutates the in-memory store synchronously, before any
//! network traffic, so a render can always read fresh state. Free-text
//! edits are coalesced per (entity, field group) behind a quiet-period
//! timer; discrete changes (selects, toggles, create/delete/reorder)
//! dispatch immediately. Remote outcomes reconcile in the background:
//! successes are silent confirmations, failures surface through the
//! injected notification sink, and only a failed create rolls local state
//! back.
//!
//! All logic runs on the host's tokio runtime; state lives behind one
//! mutex that is never held across an await, so writes to one key are
//! serialized by construction and no further locking is needed.

mod scheduler;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::ids;
use crate::models::{
    Command, CommandPatch, Link, LinkKind, LinkPatch, Note, NotePatch, NoteTag, Project,
    ProjectPatch,
};
use crate::notify::{NotifySink, Severity};
use crate::remote::{EntityKind, OneWayUpdate, Remote};
use crate::store::{EntityStore, Snapshot};
use crate::{Error, Result};

use scheduler::{PendingMap, PendingPatch, WriteGroup, WriteKey};

struct Inner {
    store: EntityStore,
    pending: PendingMap,
}

/// The dashboard engine. Cheap to clone; clones share state.
///
/// Methods that touch the network spawn onto the ambient tokio runtime,
/// so a `Dashboard` must be driven from within one.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Mutex<Inner>>,
    remote: Arc<dyn Remote>,
    sink: Arc<dyn NotifySink>,
    debounce: Duration,
    warn_on_lossy_flush: bool,
}

impl Dashboard {
    /// Create an engine over the given remote store and notification sink.
    pub fn new(remote: Arc<dyn Remote>, sink: Arc<dyn NotifySink>, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store: EntityStore::new(),
                pending: PendingMap::default(),
            })),
            remote,
            sink,
            debounce: config.debounce(),
            warn_on_lossy_flush: config.warn_on_lossy_flush,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hydrate the store from the remote's current state.
    ///
    /// This is also the manual recovery path after a reported save failure:
    /// the engine never re-merges individual responses, so a re-load is the
    /// only thing that overwrites local state with server state.
    pub async fn load(&self) -> Result<()> {
        let projects = self.remote.list_projects().await?;
        debug!(count = projects.len(), "hydrated from remote");
        self.lock().store.hydrate(projects);
        Ok(())
    }

    /// Take a read-only snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().store.snapshot()
    }

    /// Number of coalesced writes still waiting on their quiet period.
    pub fn pending_write_count(&self) -> usize {
        self.lock().pending.len()
    }

    // === Creation ===
    //
    // IDs are allocated client-side before the store is touched, so the
    // entity is displayed under its permanent key immediately and every
    // subsequent edit addresses that same key regardless of when (or
    // whether) the create call resolves.

    /// Create a project, seeded with one empty note and one empty command.
    /// Returns the new project's ID.
    pub fn add_project(&self, title: impl Into<String>) -> Result<String> {
        let mut project = Project::new(ids::allocate(ids::PROJECT_PREFIX), title.into());
        let note = Note::new(ids::allocate(ids::NOTE_PREFIX), project.id.clone());
        let command = Command::new(ids::allocate(ids::COMMAND_PREFIX), project.id.clone());
        let project_id = project.id.clone();

        {
            let mut inner = self.lock();
            project.position = inner.store.next_position();
            inner.store.insert_project(project.clone());
            inner.store.insert_note(note.clone())?;
            inner.store.insert_command(command.clone())?;
        }
        debug!(id = %project_id, "created project");

        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.remote.create_project(&project).await {
                warn!(id = %project.id, error = %e, "project create failed, rolling back");
                {
                    let mut inner = this.lock();
                    inner.pending.cancel_entity(&project.id);
                    inner.pending.cancel_entity(&note.id);
                    inner.pending.cancel_entity(&command.id);
                    let _ = inner.store.remove_project(&project.id);
                }
                this.sink.notify(
                    &format!("Could not create project: {}", e),
                    Severity::Error,
                );
                return;
            }
            if let Err(e) = this.remote.create_note(&note).await {
                this.rollback_note(&note.id, &e);
            }
            if let Err(e) = this.remote.create_command(&command).await {
                this.rollback_command(&command.id, &e);
            }
        });

        Ok(project_id)
    }

    /// Create a note under a project. Returns the new note's ID.
    pub fn add_note(
        &self,
        project_id: &str,
        tag: NoteTag,
        content: impl Into<String>,
    ) -> Result<String> {
        let mut note = Note::new(ids::allocate(ids::NOTE_PREFIX), project_id.to_string());
        note.tag = tag;
        note.content = content.into();
        let id = note.id.clone();

        self.lock().store.insert_note(note.clone())?;
        debug!(id = %id, project = %project_id, "created note");

        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.remote.create_note(&note).await {
                this.rollback_note(&note.id, &e);
            }
        });
        Ok(id)
    }

    /// Create a command under a project. Returns the new command's ID.
    pub fn add_command(
        &self,
        project_id: &str,
        command_line: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<String> {
        let mut command = Command::new(ids::allocate(ids::COMMAND_PREFIX), project_id.to_string());
        command.command = command_line.into();
        command.description = description.into();
        let id = command.id.clone();

        self.lock().store.insert_command(command.clone())?;
        debug!(id = %id, project = %project_id, "created command");

        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.remote.create_command(&command).await {
                this.rollback_command(&command.id, &e);
            }
        });
        Ok(id)
    }

    /// Create a link under a project. Returns the new link's ID.
    pub fn add_link(
        &self,
        project_id: &str,
        name: impl Into<String>,
        kind: LinkKind,
    ) -> Result<String> {
        let link = Link::new(
            ids::allocate(ids::LINK_PREFIX),
            project_id.to_string(),
            name.into(),
            kind,
        );
        let id = link.id.clone();

        self.lock().store.insert_link(link.clone())?;
        debug!(id = %id, project = %project_id, "created link");

        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.remote.create_link(&link).await {
                {
                    let mut inner = this.lock();
                    inner.pending.cancel_entity(&link.id);
                    let _ = inner.store.remove_link(&link.id);
                }
                warn!(id = %link.id, error = %e, "link create failed, rolling back");
                this.sink
                    .notify(&format!("Could not create link: {}", e), Severity::Error);
            }
        });
        Ok(id)
    }

    fn rollback_note(&self, id: &str, e: &Error) {
        {
            let mut inner = self.lock();
            inner.pending.cancel_entity(id);
            let _ = inner.store.remove_note(id);
        }
        warn!(id = %id, error = %e, "note create failed, rolling back");
        self.sink
            .notify(&format!("Could not create note: {}", e), Severity::Error);
    }

    fn rollback_command(&self, id: &str, e: &Error) {
        {
            let mut inner = self.lock();
            inner.pending.cancel_entity(id);
            let _ = inner.store.remove_command(id);
        }
        warn!(id = %id, error = %e, "command create failed, rolling back");
        self.sink
            .notify(&format!("Could not create command: {}", e), Severity::Error);
    }

    // === Field edits ===
    //
    // The store is updated with the whole patch at once; the patch then
    // splits into a debounced half (scheduled) and an immediate half
    // (dispatched now).

    /// Edit a project's fields.
    pub fn edit_project(&self, id: &str, patch: ProjectPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.lock().store.update_project(id, |p| {
            p.apply(&patch);
            p.updated_at = Utc::now();
        })?;
        let (debounced, immediate) = patch.split();
        if !immediate.is_empty() {
            self.spawn_update(id.to_string(), PendingPatch::Project(immediate));
        }
        if !debounced.is_empty() {
            self.schedule(
                WriteKey {
                    id: id.to_string(),
                    group: WriteGroup::ProjectText,
                },
                PendingPatch::Project(debounced),
            );
        }
        Ok(())
    }

    /// Toggle a project card's expansion state. Persisted server-side, but
    /// a single gesture, so it skips the debounce path.
    pub fn set_project_expanded(&self, id: &str, expanded: bool) -> Result<()> {
        self.edit_project(
            id,
            ProjectPatch {
                expanded: Some(expanded),
                ..Default::default()
            },
        )
    }

    /// Edit a note's fields.
    pub fn edit_note(&self, id: &str, patch: NotePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.lock().store.update_note(id, |n| {
            n.apply(&patch);
            n.updated_at = Utc::now();
        })?;
        let (debounced, immediate) = patch.split();
        if !immediate.is_empty() {
            self.spawn_update(id.to_string(), PendingPatch::Note(immediate));
        }
        if !debounced.is_empty() {
            self.schedule(
                WriteKey {
                    id: id.to_string(),
                    group: WriteGroup::NoteText,
                },
                PendingPatch::Note(debounced),
            );
        }
        Ok(())
    }

    /// Edit a command's fields.
    pub fn edit_command(&self, id: &str, patch: CommandPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.lock().store.update_command(id, |c| c.apply(&patch))?;
        let (debounced, _immediate) = patch.split();
        if !debounced.is_empty() {
            self.schedule(
                WriteKey {
                    id: id.to_string(),
                    group: WriteGroup::CommandText,
                },
                PendingPatch::Command(debounced),
            );
        }
        Ok(())
    }

    /// Edit a link's fields.
    pub fn edit_link(&self, id: &str, patch: LinkPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.lock().store.update_link(id, |l| l.apply(&patch))?;
        let (debounced, immediate) = patch.split();
        if !immediate.is_empty() {
            self.spawn_update(id.to_string(), PendingPatch::Link(immediate));
        }
        if !debounced.is_empty() {
            self.schedule(
                WriteKey {
                    id: id.to_string(),
                    group: WriteGroup::LinkText,
                },
                PendingPatch::Link(debounced),
            );
        }
        Ok(())
    }

    // === Deletion ===
    //
    // Optimistic and immediate: local removal happens first and is never
    // reverted. A pending debounced write for a removed entity would be a
    // stray write to a dead row, so its timer is cancelled and the queued
    // patch dropped.

    /// Delete a project and everything attached to it.
    pub fn delete_project(&self, id: &str) -> Result<()> {
        let removed = {
            let mut inner = self.lock();
            let removed = inner.store.remove_project(id)?;
            inner.pending.cancel_entity(id);
            for note in &removed.notes {
                inner.pending.cancel_entity(&note.id);
            }
            for command in &removed.commands {
                inner.pending.cancel_entity(&command.id);
            }
            for link in &removed.links {
                inner.pending.cancel_entity(&link.id);
            }
            removed
        };
        debug!(id = %removed.id, "deleted project");
        self.spawn_delete(EntityKind::Project, id.to_string());
        Ok(())
    }

    /// Delete a note.
    pub fn delete_note(&self, id: &str) -> Result<()> {
        {
            let mut inner = self.lock();
            inner.store.remove_note(id)?;
            inner.pending.cancel_entity(id);
        }
        debug!(id = %id, "deleted note");
        self.spawn_delete(EntityKind::Note, id.to_string());
        Ok(())
    }

    /// Delete a command.
    pub fn delete_command(&self, id: &str) -> Result<()> {
        {
            let mut inner = self.lock();
            inner.store.remove_command(id)?;
            inner.pending.cancel_entity(id);
        }
        debug!(id = %id, "deleted command");
        self.spawn_delete(EntityKind::Command, id.to_string());
        Ok(())
    }

    /// Delete a link.
    pub fn delete_link(&self, id: &str) -> Result<()> {
        {
            let mut inner = self.lock();
            inner.store.remove_link(id)?;
            inner.pending.cancel_entity(id);
        }
        debug!(id = %id, "deleted link");
        self.spawn_delete(EntityKind::Link, id.to_string());
        Ok(())
    }

    /// Reassign dashboard positions to match the given order.
    ///
    /// Positions are independent keys, so this fires one immediate update
    /// per project and completion order does not matter.
    pub fn reorder_projects(&self, ordered_ids: &[String]) -> Result<()> {
        {
            let mut inner = self.lock();
            let snap = inner.store.snapshot();
            for id in ordered_ids {
                if snap.project(id).is_none() {
                    return Err(Error::NotFound(format!("project {}", id)));
                }
            }
            for (position, id) in ordered_ids.iter().enumerate() {
                inner.store.update_project(id, |p| {
                    p.position = position as u32;
                    p.updated_at = Utc::now();
                })?;
            }
            inner.store.sort_by_position();
        }
        for (position, id) in ordered_ids.iter().enumerate() {
            self.spawn_update(
                id.clone(),
                PendingPatch::Project(ProjectPatch {
                    position: Some(position as u32),
                    ..Default::default()
                }),
            );
        }
        Ok(())
    }

    // === Scheduler ===

    /// Queue a debounced write: merge into the key's pending patch and
    /// restart its quiet-period timer. N edits inside the quiet period
    /// collapse into one outgoing write carrying the last value of each
    /// field.
    fn schedule(&self, key: WriteKey, patch: PendingPatch) {
        let generation = self.lock().pending.merge(key.clone(), patch);
        debug!(id = %key.id, generation, "scheduled debounced write");

        let this = self.clone();
        let timer_key = key.clone();
        let deadline = tokio::time::Instant::now() + self.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            this.fire(timer_key, generation).await;
        });
        self.lock().pending.arm(&key, generation, timer);
    }

    /// Quiet period elapsed for a key: take its patch (unless a newer edit
    /// superseded this timer) and dispatch.
    async fn fire(&self, key: WriteKey, generation: u64) {
        let patch = {
            let mut inner = self.lock();
            match inner.pending.take_if_current(&key, generation) {
                Some(patch) => patch,
                None => return,
            }
        };
        debug!(id = %key.id, "dispatching coalesced write");
        self.dispatch_update(&key.id, patch).await;
    }

    fn spawn_update(&self, id: String, patch: PendingPatch) {
        let this = self.clone();
        tokio::spawn(async move {
            this.dispatch_update(&id, patch).await;
        });
    }

    /// Send a partial update and reconcile the outcome. Success needs no
    /// merge-back (local state is authoritative); failure keeps the
    /// optimistic value and notifies, since yanking text out from under
    /// the user mid-typing is worse than a stale-sync warning.
    async fn dispatch_update(&self, id: &str, patch: PendingPatch) {
        let (kind, result) = match &patch {
            PendingPatch::Project(p) => (EntityKind::Project, self.remote.update_project(id, p).await),
            PendingPatch::Note(p) => (EntityKind::Note, self.remote.update_note(id, p).await),
            PendingPatch::Command(p) => (EntityKind::Command, self.remote.update_command(id, p).await),
            PendingPatch::Link(p) => (EntityKind::Link, self.remote.update_link(id, p).await),
        };
        if let Err(e) = result {
            warn!(id = %id, kind = %kind, error = %e, "update failed, keeping local value");
            self.sink.notify(
                &format!("Could not save {} changes: {}", kind, e),
                Severity::Warning,
            );
        }
    }

    /// Send a delete and reconcile. Failure is reported but local removal
    /// stands; re-inserting a just-deleted row would be more confusing
    /// than a rare residual-row warning.
    fn spawn_delete(&self, kind: EntityKind, id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let result = match kind {
                EntityKind::Project => this.remote.delete_project(&id).await,
                EntityKind::Note => this.remote.delete_note(&id).await,
                EntityKind::Command => this.remote.delete_command(&id).await,
                EntityKind::Link => this.remote.delete_link(&id).await,
            };
            if let Err(e) = result {
                warn!(id = %id, kind = %kind, error = %e, "delete failed on remote");
                this.sink.notify(
                    &format!("Could not delete {} on server: {}", kind, e),
                    Severity::Warning,
                );
            }
        });
    }

    // === Teardown ===

    /// Flush every queued write through the one-way transport.
    ///
    /// For the page-teardown path: the host should first push the final
    /// value of any actively edited field through the normal `edit_*`
    /// entry points (the blur handler's job), then call this. All timers
    /// are cancelled, and each remaining patch goes out as a
    /// self-contained body that the platform will attempt to deliver even
    /// as the page is discarded. Entity lifecycle is ignored here: a stray
    /// write to a row deleted elsewhere is better than losing the edit.
    ///
    /// Returns the number of writes flushed.
    pub fn flush_pending(&self) -> usize {
        let drained = self.lock().pending.drain();
        let count = drained.len();
        for (key, patch) in drained {
            self.remote.send_lossy(OneWayUpdate {
                entity_kind: key.group.entity_kind(),
                id: key.id,
                fields: patch.to_body(),
            });
        }
        if count > 0 && self.warn_on_lossy_flush {
            warn!(count, "flushed unverified writes at teardown");
        }
        count
    }

    /// Flush pending writes and log shutdown.
    pub fn shutdown(&self) {
        let flushed = self.flush_pending();
        debug!(flushed, "dashboard engine shut down");
    }
}
