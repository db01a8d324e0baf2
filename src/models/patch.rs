//! Partial-field patches.
//!
//! A patch carries only the fields an edit touched; absent fields mean
//! "leave unchanged". Patches are the unit the scheduler coalesces
//! (field-wise, later values win) and double as partial-update request
//! bodies, so they skip absent fields when serialized.
//!
//! Each patch splits into a debounced half (free-text fields that fire
//! many times while the user types) and an immediate half (discrete
//! selections that fire once per gesture).

use serde::{Deserialize, Serialize};

use super::{LinkKind, NoteTag, PathKind};

/// Partial update for a project's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_kind: Option<PathKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl ProjectPatch {
    /// Merge a later patch into this one. Fields present in `later` win.
    pub fn merge(&mut self, later: ProjectPatch) {
        merge_field(&mut self.title, later.title);
        merge_field(&mut self.description, later.description);
        merge_field(&mut self.authors, later.authors);
        merge_field(&mut self.repo_url, later.repo_url);
        merge_field(&mut self.local_path, later.local_path);
        merge_field(&mut self.path_kind, later.path_kind);
        merge_field(&mut self.subsystem, later.subsystem);
        merge_field(&mut self.expanded, later.expanded);
        merge_field(&mut self.position, later.position);
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self == &ProjectPatch::default()
    }

    /// Split into (debounced, immediate) halves.
    ///
    /// Text fields coalesce behind the quiet-period timer; discrete
    /// selections (path kind, expansion, position) dispatch at once.
    pub fn split(self) -> (ProjectPatch, ProjectPatch) {
        let immediate = ProjectPatch {
            path_kind: self.path_kind,
            expanded: self.expanded,
            position: self.position,
            ..Default::default()
        };
        let debounced = ProjectPatch {
            title: self.title,
            description: self.description,
            authors: self.authors,
            repo_url: self.repo_url,
            local_path: self.local_path,
            subsystem: self.subsystem,
            ..Default::default()
        };
        (debounced, immediate)
    }
}

/// Partial update for a note's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<NoteTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    /// Merge a later patch into this one. Fields present in `later` win.
    pub fn merge(&mut self, later: NotePatch) {
        merge_field(&mut self.tag, later.tag);
        merge_field(&mut self.content, later.content);
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self == &NotePatch::default()
    }

    /// Split into (debounced, immediate) halves: content coalesces, a tag
    /// change dispatches at once.
    pub fn split(self) -> (NotePatch, NotePatch) {
        let immediate = NotePatch {
            tag: self.tag,
            ..Default::default()
        };
        let debounced = NotePatch {
            content: self.content,
            ..Default::default()
        };
        (debounced, immediate)
    }
}

/// Partial update for a command's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CommandPatch {
    /// Merge a later patch into this one. Fields present in `later` win.
    pub fn merge(&mut self, later: CommandPatch) {
        merge_field(&mut self.command, later.command);
        merge_field(&mut self.description, later.description);
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self == &CommandPatch::default()
    }

    /// Split into (debounced, immediate) halves. Both command fields are
    /// free text, so the immediate half is always empty.
    pub fn split(self) -> (CommandPatch, CommandPatch) {
        (self, CommandPatch::default())
    }
}

/// Partial update for a link's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<LinkKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_kind: Option<PathKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
}

impl LinkPatch {
    /// Merge a later patch into this one. Fields present in `later` win.
    pub fn merge(&mut self, later: LinkPatch) {
        merge_field(&mut self.name, later.name);
        merge_field(&mut self.description, later.description);
        merge_field(&mut self.kind, later.kind);
        merge_field(&mut self.url, later.url);
        merge_field(&mut self.path, later.path);
        merge_field(&mut self.path_kind, later.path_kind);
        merge_field(&mut self.subsystem, later.subsystem);
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self == &LinkPatch::default()
    }

    /// Split into (debounced, immediate) halves: text payload coalesces,
    /// kind and path-kind selections dispatch at once.
    pub fn split(self) -> (LinkPatch, LinkPatch) {
        let immediate = LinkPatch {
            kind: self.kind,
            path_kind: self.path_kind,
            ..Default::default()
        };
        let debounced = LinkPatch {
            name: self.name,
            description: self.description,
            url: self.url,
            path: self.path,
            subsystem: self.subsystem,
            ..Default::default()
        };
        (debounced, immediate)
    }
}

fn merge_field<T>(slot: &mut Option<T>, later: Option<T>) {
    if later.is_some() {
        *slot = later;
    }
}
