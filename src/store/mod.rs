//! In-memory entity store.
//!
//! The store holds the client's authoritative copy of the dashboard: an
//! ordered list of projects, each owning its notes, commands, and links.
//! It is the presentation source of truth; network traffic never blocks a
//! read from it.
//!
//! All updates are copy-on-write. Records sit behind `Arc`, and a mutation
//! clones the affected record (and its owning project), applies the change,
//! and swaps the `Arc` in. A snapshot taken before the mutation is
//! untouched, and observers can diff snapshots with `Arc::ptr_eq`.
//!
//! Only the sync engine mutates the store; everything else reads snapshots.

use std::sync::Arc;

use crate::models::{Command, Link, Note, Project};
use crate::{Error, Result};

/// A read-only view of the store at one instant.
///
/// Cheap to take (one `Arc` clone per project) and immutable; later
/// mutations produce new records rather than touching these.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Projects in dashboard order.
    pub projects: Vec<Arc<Project>>,
}

impl Snapshot {
    /// Look up a project by ID.
    pub fn project(&self, id: &str) -> Option<&Arc<Project>> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Look up a note by ID across all projects.
    pub fn note(&self, id: &str) -> Option<&Arc<Note>> {
        self.projects
            .iter()
            .find_map(|p| p.notes.iter().find(|n| n.id == id))
    }

    /// Look up a command by ID across all projects.
    pub fn command(&self, id: &str) -> Option<&Arc<Command>> {
        self.projects
            .iter()
            .find_map(|p| p.commands.iter().find(|c| c.id == id))
    }

    /// Look up a link by ID across all projects.
    pub fn link(&self, id: &str) -> Option<&Arc<Link>> {
        self.projects
            .iter()
            .find_map(|p| p.links.iter().find(|l| l.id == id))
    }
}

/// The in-memory entity store.
#[derive(Debug, Default)]
pub struct EntityStore {
    projects: Vec<Arc<Project>>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store contents with server state, ordered by position.
    pub fn hydrate(&mut self, mut projects: Vec<Project>) {
        projects.sort_by_key(|p| p.position);
        self.projects = projects.into_iter().map(Arc::new).collect();
    }

    /// Take a read-only snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            projects: self.projects.clone(),
        }
    }

    /// Next free dashboard position.
    pub fn next_position(&self) -> u32 {
        self.projects
            .iter()
            .map(|p| p.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Insert a new project, keeping dashboard order.
    pub fn insert_project(&mut self, project: Project) {
        self.projects.push(Arc::new(project));
        self.sort_by_position();
    }

    /// Apply a closure to a project record, copy-on-write.
    pub fn update_project(&mut self, id: &str, f: impl FnOnce(&mut Project)) -> Result<()> {
        let slot = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))?;
        let mut next = Project::clone(slot);
        f(&mut next);
        *slot = Arc::new(next);
        Ok(())
    }

    /// Remove a project and all its children. Returns the removed record
    /// so callers can enumerate the cascaded child IDs.
    pub fn remove_project(&mut self, id: &str) -> Result<Arc<Project>> {
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))?;
        Ok(self.projects.remove(idx))
    }

    /// Re-sort projects by position after a reorder.
    pub fn sort_by_position(&mut self) {
        self.projects.sort_by_key(|p| p.position);
    }

    /// Insert a note under its owning project.
    pub fn insert_note(&mut self, note: Note) -> Result<()> {
        let project_id = note.project_id.clone();
        self.update_project(&project_id, |p| p.notes.push(Arc::new(note)))
    }

    /// Apply a closure to a note record, copy-on-write through its project.
    pub fn update_note(&mut self, id: &str, f: impl FnOnce(&mut Note)) -> Result<()> {
        for slot in &mut self.projects {
            if let Some(idx) = slot.notes.iter().position(|n| n.id == id) {
                let mut project = Project::clone(slot);
                let mut note = Note::clone(&project.notes[idx]);
                f(&mut note);
                project.notes[idx] = Arc::new(note);
                *slot = Arc::new(project);
                return Ok(());
            }
        }
        Err(Error::NotFound(format!("note {}", id)))
    }

    /// Remove a note. Returns the removed record.
    pub fn remove_note(&mut self, id: &str) -> Result<Arc<Note>> {
        for slot in &mut self.projects {
            if let Some(idx) = slot.notes.iter().position(|n| n.id == id) {
                let mut project = Project::clone(slot);
                let removed = project.notes.remove(idx);
                *slot = Arc::new(project);
                return Ok(removed);
            }
        }
        Err(Error::NotFound(format!("note {}", id)))
    }

    /// Insert a command under its owning project.
    pub fn insert_command(&mut self, command: Command) -> Result<()> {
        let project_id = command.project_id.clone();
        self.update_project(&project_id, |p| p.commands.push(Arc::new(command)))
    }

    /// Apply a closure to a command record, copy-on-write through its
    /// project.
    pub fn update_command(&mut self, id: &str, f: impl FnOnce(&mut Command)) -> Result<()> {
        for slot in &mut self.projects {
            if let Some(idx) = slot.commands.iter().position(|c| c.id == id) {
                let mut project = Project::clone(slot);
                let mut command = Command::clone(&project.commands[idx]);
                f(&mut command);
                project.commands[idx] = Arc::new(command);
                *slot = Arc::new(project);
                return Ok(());
            }
        }
        Err(Error::NotFound(format!("command {}", id)))
    }

    /// Remove a command. Returns the removed record.
    pub fn remove_command(&mut self, id: &str) -> Result<Arc<Command>> {
        for slot in &mut self.projects {
            if let Some(idx) = slot.commands.iter().position(|c| c.id == id) {
                let mut project = Project::clone(slot);
                let removed = project.commands.remove(idx);
                *slot = Arc::new(project);
                return Ok(removed);
            }
        }
        Err(Error::NotFound(format!("command {}", id)))
    }

    /// Insert a link under its owning project.
    pub fn insert_link(&mut self, link: Link) -> Result<()> {
        let project_id = link.project_id.clone();
        self.update_project(&project_id, |p| p.links.push(Arc::new(link)))
    }

    /// Apply a closure to a link record, copy-on-write through its project.
    pub fn update_link(&mut self, id: &str, f: impl FnOnce(&mut Link)) -> Result<()> {
        for slot in &mut self.projects {
            if let Some(idx) = slot.links.iter().position(|l| l.id == id) {
                let mut project = Project::clone(slot);
                let mut link = Link::clone(&project.links[idx]);
                f(&mut link);
                project.links[idx] = Arc::new(link);
                *slot = Arc::new(project);
                return Ok(());
            }
        }
        Err(Error::NotFound(format!("link {}", id)))
    }

    /// Remove a link. Returns the removed record.
    pub fn remove_link(&mut self, id: &str) -> Result<Arc<Link>> {
        for slot in &mut self.projects {
            if let Some(idx) = slot.links.iter().position(|l| l.id == id) {
                let mut project = Project::clone(slot);
                let removed = project.links.remove(idx);
                *slot = Arc::new(project);
                return Ok(removed);
            }
        }
        Err(Error::NotFound(format!("link {}", id)))
    }
}
