//! Remote store boundary.
//!
//! The dashboard never talks to the network directly; it calls through the
//! [`Remote`] trait. The host wires in a real client (HTTP, WebSocket,
//! whatever the deployment uses), and tests wire in a recording mock. All
//! calls are scoped by an ambient caller identity on the other side of the
//! trait; the engine never sees credentials.
//!
//! The engine only cares about success or failure. It does not inspect why
//! a call failed, and it never re-merges a success response into the store:
//! the local copy is already authoritative, and overwriting it could
//! clobber an edit made while the request was in flight.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Result;
use crate::models::{Command, CommandPatch, Link, LinkPatch, Note, NotePatch, Project, ProjectPatch};

/// The four entity kinds the remote store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Note,
    Command,
    Link,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Note => write!(f, "note"),
            EntityKind::Command => write!(f, "command"),
            EntityKind::Link => write!(f, "link"),
        }
    }
}

/// A self-contained one-way update body for the teardown path.
///
/// Sent while the page is being discarded, so no response will ever be
/// observed; the body must carry everything the server needs, including
/// the entity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneWayUpdate {
    pub entity_kind: EntityKind,
    pub id: String,
    pub fields: serde_json::Value,
}

/// Interface to the remote store, one set of operations per entity kind.
///
/// Creation requests carry the full record including its client-allocated
/// ID; the server persists the key the client is already displaying, so a
/// successful create confirms rather than renames.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Fetch the caller's projects with children, for initial hydration.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn create_project(&self, project: &Project) -> Result<()>;
    async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<()>;
    async fn delete_project(&self, id: &str) -> Result<()>;

    async fn create_note(&self, note: &Note) -> Result<()>;
    async fn update_note(&self, id: &str, patch: &NotePatch) -> Result<()>;
    async fn delete_note(&self, id: &str) -> Result<()>;

    async fn create_command(&self, command: &Command) -> Result<()>;
    async fn update_command(&self, id: &str, patch: &CommandPatch) -> Result<()>;
    async fn delete_command(&self, id: &str) -> Result<()>;

    async fn create_link(&self, link: &Link) -> Result<()>;
    async fn update_link(&self, id: &str, patch: &LinkPatch) -> Result<()>;
    async fn delete_link(&self, id: &str) -> Result<()>;

    /// Best-effort one-way update, guaranteed by the platform to be
    /// attempted even during page teardown. No response is observable and
    /// no error is reported; callers accept that the write is unverified.
    fn send_lossy(&self, update: OneWayUpdate);
}
