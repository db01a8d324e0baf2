//! Assistant-proposed actions.
//!
//! The chat assistant is an external collaborator that translates natural
//! language ("add a bug note to alpha saying the build is broken") into
//! structured actions. Accepting one routes it through the same entry
//! points as a direct gesture, so assistant-driven mutations get identical
//! optimistic, debounce, and reconcile semantics. Translation itself never
//! happens here.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::{CommandPatch, LinkKind, LinkPatch, NotePatch, NoteTag, ProjectPatch};
use crate::sync::Dashboard;

/// A structured action proposed by the assistant, ready for the user to
/// accept. Serialized form matches what the translation service emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AssistantAction {
    CreateProject {
        title: String,
    },
    UpdateProject {
        id: String,
        patch: ProjectPatch,
    },
    DeleteProject {
        id: String,
    },
    CreateNote {
        project_id: String,
        #[serde(default)]
        tag: NoteTag,
        #[serde(default)]
        content: String,
    },
    UpdateNote {
        id: String,
        patch: NotePatch,
    },
    DeleteNote {
        id: String,
    },
    CreateCommand {
        project_id: String,
        #[serde(default)]
        command: String,
        #[serde(default)]
        description: String,
    },
    UpdateCommand {
        id: String,
        patch: CommandPatch,
    },
    DeleteCommand {
        id: String,
    },
    CreateLink {
        project_id: String,
        name: String,
        #[serde(default)]
        kind: LinkKind,
        #[serde(default)]
        patch: LinkPatch,
    },
    UpdateLink {
        id: String,
        patch: LinkPatch,
    },
    DeleteLink {
        id: String,
    },
    ReorderProjects {
        ids: Vec<String>,
    },
}

impl Dashboard {
    /// Apply an accepted assistant action.
    ///
    /// Returns the new entity's ID for create actions, `None` otherwise.
    pub fn apply_action(&self, action: AssistantAction) -> Result<Option<String>> {
        match action {
            AssistantAction::CreateProject { title } => self.add_project(title).map(Some),
            AssistantAction::UpdateProject { id, patch } => {
                self.edit_project(&id, patch).map(|_| None)
            }
            AssistantAction::DeleteProject { id } => self.delete_project(&id).map(|_| None),
            AssistantAction::CreateNote {
                project_id,
                tag,
                content,
            } => self.add_note(&project_id, tag, content).map(Some),
            AssistantAction::UpdateNote { id, patch } => self.edit_note(&id, patch).map(|_| None),
            AssistantAction::DeleteNote { id } => self.delete_note(&id).map(|_| None),
            AssistantAction::CreateCommand {
                project_id,
                command,
                description,
            } => self
                .add_command(&project_id, command, description)
                .map(Some),
            AssistantAction::UpdateCommand { id, patch } => {
                self.edit_command(&id, patch).map(|_| None)
            }
            AssistantAction::DeleteCommand { id } => self.delete_command(&id).map(|_| None),
            AssistantAction::CreateLink {
                project_id,
                name,
                kind,
                patch,
            } => {
                let id = self.add_link(&project_id, name, kind)?;
                if !patch.is_empty() {
                    self.edit_link(&id, patch)?;
                }
                Ok(Some(id))
            }
            AssistantAction::UpdateLink { id, patch } => self.edit_link(&id, patch).map(|_| None),
            AssistantAction::DeleteLink { id } => self.delete_link(&id).map(|_| None),
            AssistantAction::ReorderProjects { ids } => {
                self.reorder_projects(&ids).map(|_| None)
            }
        }
    }
}
