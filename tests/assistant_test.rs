//! Assistant actions flow through the same mutation pipeline as direct
//! gestures.

mod common;

use std::time::Duration;

use common::{RemoteCall, harness, settle};
use wheelhouse::assistant::AssistantAction;
use wheelhouse::models::{LinkKind, LinkPatch, NotePatch, NoteTag};

#[tokio::test(start_paused = true)]
async fn test_create_note_action_is_optimistic() {
    let (dashboard, remote, _sink) = harness();
    let project_id = dashboard.add_project("Alpha").unwrap();
    settle().await;
    remote.calls.lock().unwrap().clear();

    let note_id = dashboard
        .apply_action(AssistantAction::CreateNote {
            project_id: project_id.clone(),
            tag: NoteTag::Bug,
            content: "the build is broken".into(),
        })
        .unwrap()
        .unwrap();

    let snap = dashboard.snapshot();
    let note = snap.note(&note_id).unwrap();
    assert_eq!(note.tag, NoteTag::Bug);
    assert_eq!(note.content, "the build is broken");

    settle().await;
    assert!(
        remote
            .recorded()
            .iter()
            .any(|c| matches!(c, RemoteCall::CreateNote(n) if n.id == note_id))
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_action_debounces_like_a_direct_edit() {
    let (dashboard, remote, _sink) = harness();
    let project_id = dashboard.add_project("Alpha").unwrap();
    let note_id = dashboard.add_note(&project_id, NoteTag::Note, "").unwrap();
    settle().await;
    remote.calls.lock().unwrap().clear();

    dashboard
        .apply_action(AssistantAction::UpdateNote {
            id: note_id.clone(),
            patch: NotePatch {
                content: Some("rewritten by assistant".into()),
                ..Default::default()
            },
        })
        .unwrap();

    assert_eq!(dashboard.pending_write_count(), 1);
    tokio::time::advance(Duration::from_millis(600)).await;
    settle().await;
    assert_eq!(remote.note_updates(&note_id).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_create_link_action_carries_payload() {
    let (dashboard, remote, _sink) = harness();
    let project_id = dashboard.add_project("Alpha").unwrap();
    settle().await;
    remote.calls.lock().unwrap().clear();

    let link_id = dashboard
        .apply_action(AssistantAction::CreateLink {
            project_id: project_id.clone(),
            name: "CI".into(),
            kind: LinkKind::Web,
            patch: LinkPatch {
                url: Some("https://ci.example.com/alpha".into()),
                ..Default::default()
            },
        })
        .unwrap()
        .unwrap();

    let snap = dashboard.snapshot();
    let link = snap.link(&link_id).unwrap();
    assert_eq!(link.name, "CI");
    assert_eq!(link.url, "https://ci.example.com/alpha");

    tokio::time::advance(Duration::from_millis(600)).await;
    settle().await;
    assert!(
        remote
            .recorded()
            .iter()
            .any(|c| matches!(c, RemoteCall::CreateLink(l) if l.id == link_id))
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_action_on_unknown_id_is_a_local_error() {
    let (dashboard, remote, _sink) = harness();
    let err = dashboard
        .apply_action(AssistantAction::DeleteNote {
            id: "nt-ffffffffffff".into(),
        })
        .unwrap_err();
    assert!(matches!(err, wheelhouse::Error::NotFound(_)));
    settle().await;
    assert!(remote.recorded().is_empty());
}
