//! Data models for Wheelhouse entities.
//!
//! This module defines the core data structures:
//! - `Project` - A tracked project with its child collections
//! - `Note` - Free-text notes with a classification tag
//! - `Command` - Shell-command snippets attached to a project
//! - `Link` - Quick-launch links (web URL, editor launch, or path copy)
//!
//! Records are treated as immutable: children are held behind `Arc` so a
//! field edit produces a fresh record and a fresh containing collection,
//! and observers can detect changes by pointer equality alone.

pub mod patch;

pub use patch::{CommandPatch, LinkPatch, NotePatch, ProjectPatch};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Classification tag for a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTag {
    #[default]
    Note,
    Bug,
    Feature,
    Idea,
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteTag::Note => write!(f, "note"),
            NoteTag::Bug => write!(f, "bug"),
            NoteTag::Feature => write!(f, "feature"),
            NoteTag::Idea => write!(f, "idea"),
        }
    }
}

/// Whether a filesystem path is native or lives inside a remote subsystem
/// (e.g., a WSL distribution reached from the host).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    #[default]
    Native,
    RemoteSubsystem,
}

/// What a link does when activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Open a web URL.
    #[default]
    Web,
    /// Launch an editor at a filesystem path.
    EditorLaunch,
    /// Copy a filesystem path to the clipboard.
    PathCopy,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Web => write!(f, "web"),
            LinkKind::EditorLaunch => write!(f, "editor_launch"),
            LinkKind::PathCopy => write!(f, "path_copy"),
        }
    }
}

/// A tracked project. Owns its notes, commands, and links; deleting a
/// project cascades to all three collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier (e.g., "pr-a1b2c3d4e5f6")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "Project::type_marker")]
    pub entity_type: String,

    /// Project title
    #[serde(default)]
    pub title: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Author names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// External repository URL
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo_url: String,

    /// Local checkout path
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub local_path: String,

    /// Whether `local_path` is native or inside a remote subsystem
    #[serde(default)]
    pub path_kind: PathKind,

    /// Remote subsystem name (e.g., WSL distro) when `path_kind` is
    /// `RemoteSubsystem`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subsystem: String,

    /// Whether the project card is expanded in the dashboard.
    /// UI state, but persisted server-side like any other field.
    #[serde(default)]
    pub expanded: bool,

    /// Sort position within the dashboard
    #[serde(default)]
    pub position: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Attached notes
    #[serde(default)]
    pub notes: Vec<Arc<Note>>,

    /// Attached shell-command snippets
    #[serde(default)]
    pub commands: Vec<Arc<Command>>,

    /// Attached quick-launch links
    #[serde(default)]
    pub links: Vec<Arc<Link>>,
}

impl Project {
    fn type_marker() -> String {
        "project".to_string()
    }

    /// Create a new empty project with the given ID and title.
    pub fn new(id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: Self::type_marker(),
            title,
            description: String::new(),
            authors: Vec::new(),
            repo_url: String::new(),
            local_path: String::new(),
            path_kind: PathKind::default(),
            subsystem: String::new(),
            expanded: true,
            position: 0,
            created_at: now,
            updated_at: now,
            notes: Vec::new(),
            commands: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Apply a partial-field patch. Only fields present in the patch change.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.authors {
            self.authors = v.clone();
        }
        if let Some(v) = &patch.repo_url {
            self.repo_url = v.clone();
        }
        if let Some(v) = &patch.local_path {
            self.local_path = v.clone();
        }
        if let Some(v) = patch.path_kind {
            self.path_kind = v;
        }
        if let Some(v) = &patch.subsystem {
            self.subsystem = v.clone();
        }
        if let Some(v) = patch.expanded {
            self.expanded = v;
        }
        if let Some(v) = patch.position {
            self.position = v;
        }
    }
}

/// A free-text note attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier (e.g., "nt-a1b2c3d4e5f6")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "Note::type_marker")]
    pub entity_type: String,

    /// Owning project ID
    pub project_id: String,

    /// Classification tag
    #[serde(default)]
    pub tag: NoteTag,

    /// Free-text content
    #[serde(default)]
    pub content: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Note {
    fn type_marker() -> String {
        "note".to_string()
    }

    /// Create a new empty note attached to the given project.
    pub fn new(id: String, project_id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: Self::type_marker(),
            project_id,
            tag: NoteTag::default(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial-field patch.
    pub fn apply(&mut self, patch: &NotePatch) {
        if let Some(v) = patch.tag {
            self.tag = v;
        }
        if let Some(v) = &patch.content {
            self.content = v.clone();
        }
    }
}

/// A shell-command snippet attached to a project.
///
/// Commands carry no update timestamp; the record is overwritten in place
/// server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Unique identifier (e.g., "cm-a1b2c3d4e5f6")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "Command::type_marker")]
    pub entity_type: String,

    /// Owning project ID
    pub project_id: String,

    /// The literal shell command
    #[serde(default)]
    pub command: String,

    /// What the command is for
    #[serde(default)]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Command {
    fn type_marker() -> String {
        "command".to_string()
    }

    /// Create a new empty command attached to the given project.
    pub fn new(id: String, project_id: String) -> Self {
        Self {
            id,
            entity_type: Self::type_marker(),
            project_id,
            command: String::new(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Apply a partial-field patch.
    pub fn apply(&mut self, patch: &CommandPatch) {
        if let Some(v) = &patch.command {
            self.command = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
    }
}

/// A quick-launch link attached to a project.
///
/// The payload fields used depend on `kind`: `Web` reads `url`,
/// `EditorLaunch` and `PathCopy` read `path`/`path_kind`/`subsystem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier (e.g., "lk-a1b2c3d4e5f6")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "Link::type_marker")]
    pub entity_type: String,

    /// Owning project ID
    pub project_id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// What activating the link does
    #[serde(default)]
    pub kind: LinkKind,

    /// Web URL (used when `kind` is `Web`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Filesystem path (used when `kind` is `EditorLaunch` or `PathCopy`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Whether `path` is native or inside a remote subsystem
    #[serde(default)]
    pub path_kind: PathKind,

    /// Remote subsystem name when `path_kind` is `RemoteSubsystem`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subsystem: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Link {
    fn type_marker() -> String {
        "link".to_string()
    }

    /// Create a new link attached to the given project.
    pub fn new(id: String, project_id: String, name: String, kind: LinkKind) -> Self {
        Self {
            id,
            entity_type: Self::type_marker(),
            project_id,
            name,
            description: String::new(),
            kind,
            url: String::new(),
            path: String::new(),
            path_kind: PathKind::default(),
            subsystem: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Apply a partial-field patch.
    pub fn apply(&mut self, patch: &LinkPatch) {
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = patch.kind {
            self.kind = v;
        }
        if let Some(v) = &patch.url {
            self.url = v.clone();
        }
        if let Some(v) = &patch.path {
            self.path = v.clone();
        }
        if let Some(v) = patch.path_kind {
            self.path_kind = v;
        }
        if let Some(v) = &patch.subsystem {
            self.subsystem = v.clone();
        }
    }
}
