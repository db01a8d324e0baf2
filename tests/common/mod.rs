//! Common test utilities for wheelhouse integration tests.
//!
//! Provides a recording `MockRemote` with per-operation failure injection,
//! a `CollectingSink` that captures notifications, and a `harness()`
//! constructor wiring both into a `Dashboard`.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wheelhouse::config::SyncConfig;
use wheelhouse::models::{
    Command, CommandPatch, Link, LinkPatch, Note, NotePatch, Project, ProjectPatch,
};
use wheelhouse::notify::{NotifySink, Severity};
use wheelhouse::remote::{OneWayUpdate, Remote};
use wheelhouse::sync::Dashboard;
use wheelhouse::{Error, Result};

/// One recorded remote call.
#[derive(Debug, Clone)]
pub enum RemoteCall {
    CreateProject(Project),
    UpdateProject { id: String, patch: ProjectPatch },
    DeleteProject(String),
    CreateNote(Note),
    UpdateNote { id: String, patch: NotePatch },
    DeleteNote(String),
    CreateCommand(Command),
    UpdateCommand { id: String, patch: CommandPatch },
    DeleteCommand(String),
    CreateLink(Link),
    UpdateLink { id: String, patch: LinkPatch },
    DeleteLink(String),
}

/// In-memory recording remote with failure injection.
///
/// `fail("create_note")` makes every subsequent `create_note` call return
/// a transport error; all calls (successful or not) are recorded in order.
#[derive(Default)]
pub struct MockRemote {
    pub calls: Mutex<Vec<RemoteCall>>,
    pub lossy: Mutex<Vec<OneWayUpdate>>,
    pub server_projects: Mutex<Vec<Project>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the named operation fail from now on.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Let the named operation succeed again.
    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            Err(Error::Transport(format!("injected failure: {}", op)))
        } else {
            Ok(())
        }
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// All recorded calls, in issue order.
    pub fn recorded(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded update calls for one note, newest last.
    pub fn note_updates(&self, note_id: &str) -> Vec<NotePatch> {
        self.recorded()
            .into_iter()
            .filter_map(|c| match c {
                RemoteCall::UpdateNote { id, patch } if id == note_id => Some(patch),
                _ => None,
            })
            .collect()
    }

    /// Recorded update calls for one project, newest last.
    pub fn project_updates(&self, project_id: &str) -> Vec<ProjectPatch> {
        self.recorded()
            .into_iter()
            .filter_map(|c| match c {
                RemoteCall::UpdateProject { id, patch } if id == project_id => Some(patch),
                _ => None,
            })
            .collect()
    }

    /// Bodies pushed through the one-way teardown transport.
    pub fn lossy_sends(&self) -> Vec<OneWayUpdate> {
        self.lossy.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remote for MockRemote {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.check("list_projects")?;
        Ok(self.server_projects.lock().unwrap().clone())
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        self.record(RemoteCall::CreateProject(project.clone()));
        self.check("create_project")
    }

    async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<()> {
        self.record(RemoteCall::UpdateProject {
            id: id.to_string(),
            patch: patch.clone(),
        });
        self.check("update_project")
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        self.record(RemoteCall::DeleteProject(id.to_string()));
        self.check("delete_project")
    }

    async fn create_note(&self, note: &Note) -> Result<()> {
        self.record(RemoteCall::CreateNote(note.clone()));
        self.check("create_note")
    }

    async fn update_note(&self, id: &str, patch: &NotePatch) -> Result<()> {
        self.record(RemoteCall::UpdateNote {
            id: id.to_string(),
            patch: patch.clone(),
        });
        self.check("update_note")
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.record(RemoteCall::DeleteNote(id.to_string()));
        self.check("delete_note")
    }

    async fn create_command(&self, command: &Command) -> Result<()> {
        self.record(RemoteCall::CreateCommand(command.clone()));
        self.check("create_command")
    }

    async fn update_command(&self, id: &str, patch: &CommandPatch) -> Result<()> {
        self.record(RemoteCall::UpdateCommand {
            id: id.to_string(),
            patch: patch.clone(),
        });
        self.check("update_command")
    }

    async fn delete_command(&self, id: &str) -> Result<()> {
        self.record(RemoteCall::DeleteCommand(id.to_string()));
        self.check("delete_command")
    }

    async fn create_link(&self, link: &Link) -> Result<()> {
        self.record(RemoteCall::CreateLink(link.clone()));
        self.check("create_link")
    }

    async fn update_link(&self, id: &str, patch: &LinkPatch) -> Result<()> {
        self.record(RemoteCall::UpdateLink {
            id: id.to_string(),
            patch: patch.clone(),
        });
        self.check("update_link")
    }

    async fn delete_link(&self, id: &str) -> Result<()> {
        self.record(RemoteCall::DeleteLink(id.to_string()));
        self.check("delete_link")
    }

    fn send_lossy(&self, update: OneWayUpdate) {
        self.lossy.lock().unwrap().push(update);
    }
}

/// Notification sink that collects messages for assertions.
#[derive(Default)]
pub struct CollectingSink {
    pub messages: Mutex<Vec<(String, Severity)>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn collected(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotifySink for CollectingSink {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

/// Build a dashboard over a fresh mock remote and collecting sink, with
/// the default 500ms quiet period.
pub fn harness() -> (Dashboard, Arc<MockRemote>, Arc<CollectingSink>) {
    let remote = MockRemote::new();
    let sink = CollectingSink::new();
    let dashboard = Dashboard::new(remote.clone(), sink.clone(), SyncConfig::default());
    (dashboard, remote, sink)
}

/// Let already-spawned tasks run to completion on the current-thread
/// runtime. The mock remote never suspends, so a handful of yields is
/// enough for every in-flight task to finish.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
