//! Integration tests for the ServerContext → capture/publish/classify
//! pipeline, driven with mock adapters.

use std::path::PathBuf;

use colorimetry::app::commands::{Command, Response};
use colorimetry::app::events::AppEvent;
use colorimetry::app::service::ServerContext;
use colorimetry::error::{DispatchError, Disposition};

use crate::mock_hw::{
    CANONICAL, MockCamera, MockPublisher, RecordingSink, Shot, context, context_with, files_in,
};

type Ctx = ServerContext<MockCamera, MockPublisher>;

/// Run one command and render it the way the dispatcher would.
fn reply(ctx: &mut Ctx, sink: &mut RecordingSink, text: &str) -> String {
    match ctx.handle_command(&Command::parse(text), sink) {
        Ok(response) => response.as_str().to_owned(),
        Err(err) => match err.disposition() {
            Disposition::Respond(response) => response.as_str().to_owned(),
            other => panic!("{text}: unexpected disposition {other:?} for {err}"),
        },
    }
}

fn current_path(ctx: &Ctx) -> PathBuf {
    ctx.session().current_artifact().unwrap().path().to_path_buf()
}

#[test]
fn unknown_commands_get_the_fallback_reply() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[]));
    let mut sink = RecordingSink::default();

    for text in ["", "Click", "click\n", " analyze", "sendThyResult", "status", "msg:Not supported"] {
        assert_eq!(reply(&mut ctx, &mut sink, text), Response::NOT_SUPPORTED, "{text:?}");
    }
    assert!(ctx.session().current_artifact().is_none());
    assert_eq!(ctx.capture().settings().canonical_size, CANONICAL);
}

#[test]
fn click_publishes_and_records_the_reference() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[100]));
    let mut sink = RecordingSink::default();

    let r1 = reply(&mut ctx, &mut sink, "click");
    assert_eq!(r1, "https://cdn.mock/R1");

    let artifact = ctx.session().current_artifact().unwrap();
    assert_eq!(artifact.pixels().dimensions(), (CANONICAL, CANONICAL));
    assert!(artifact.path().exists());
    assert_eq!(ctx.publisher().uploads, vec![artifact.path().to_path_buf()]);
    assert_eq!(ctx.publisher().content_types, vec!["image/png"]);
    assert_eq!(
        ctx.session().current_reference().map(|r| r.artifact()),
        Some(artifact.id())
    );

    assert_eq!(sink.count(|e| matches!(e, AppEvent::ArtifactCaptured { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ArtifactPublished { .. })), 1);
}

#[test]
fn sendthyresult_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[100]));
    let mut sink = RecordingSink::default();

    let r1 = reply(&mut ctx, &mut sink, "click");
    assert_eq!(reply(&mut ctx, &mut sink, "sendthyresult"), r1);
    assert_eq!(reply(&mut ctx, &mut sink, "sendthyresult"), r1);
    assert_eq!(ctx.publisher().uploads.len(), 1);
}

#[test]
fn commands_before_any_click_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[]));
    let mut sink = RecordingSink::default();

    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), Response::NOTHING_TO_ANALYZE);
    assert_eq!(reply(&mut ctx, &mut sink, "sendthyresult"), Response::NO_RESULT);
    assert!(matches!(
        ctx.handle_command(&Command::Analyze, &mut sink),
        Err(DispatchError::NothingToAnalyze(_))
    ));
}

#[test]
fn analyze_returns_the_level_of_the_current_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[50, 200]));
    let mut sink = RecordingSink::default();

    reply(&mut ctx, &mut sink, "click");
    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), "1");
    reply(&mut ctx, &mut sink, "click");
    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), "4");

    let classified: Vec<u8> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Classified { level, .. } => Some(level.get()),
            _ => None,
        })
        .collect();
    assert_eq!(classified, vec![1, 4]);
}

#[test]
fn analyze_does_not_consume_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[150]));
    let mut sink = RecordingSink::default();

    let r1 = reply(&mut ctx, &mut sink, "click");
    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), "3");
    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), "3");
    assert_eq!(reply(&mut ctx, &mut sink, "sendthyresult"), r1);
}

#[test]
fn new_click_replaces_artifact_and_reference() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[100, 100]));
    let mut sink = RecordingSink::default();

    let r1 = reply(&mut ctx, &mut sink, "click");
    let first = current_path(&ctx);
    let r2 = reply(&mut ctx, &mut sink, "click");

    assert_ne!(r1, r2);
    assert_eq!(reply(&mut ctx, &mut sink, "sendthyresult"), r2);
    assert_ne!(current_path(&ctx), first);
    assert!(!first.exists(), "superseded artifact should be removed");
    assert_eq!(files_in(dir.path()), 1);
}

#[test]
fn retained_artifacts_stay_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context_with(dir.path(), MockCamera::greys(&[100, 100, 100]), true);
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        reply(&mut ctx, &mut sink, "click");
    }
    assert_eq!(files_in(dir.path()), 3);
}

#[test]
fn failed_publish_leaves_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::greys(&[50, 250]));
    let mut sink = RecordingSink::default();

    let r1 = reply(&mut ctx, &mut sink, "click");
    let first = current_path(&ctx);

    ctx.publisher_mut().fail = true;
    assert_eq!(reply(&mut ctx, &mut sink, "click"), Response::PUBLISH_FAILED);

    // Neither the new artifact nor a new reference was recorded.
    assert_eq!(current_path(&ctx), first);
    assert_eq!(reply(&mut ctx, &mut sink, "sendthyresult"), r1);
    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), "1");
    assert_eq!(files_in(dir.path()), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ArtifactCaptured { .. })), 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ArtifactPublished { .. })), 1);

    ctx.publisher_mut().fail = false;
    let r2 = reply(&mut ctx, &mut sink, "click");
    assert_ne!(r2, r1);
}

#[test]
fn capture_fault_is_reported_and_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), MockCamera::new([Shot::Fault, Shot::Grey(200)]));
    let mut sink = RecordingSink::default();

    assert_eq!(reply(&mut ctx, &mut sink, "click"), Response::CAPTURE_FAILED);
    assert!(ctx.session().current_artifact().is_none());
    assert!(ctx.publisher().uploads.is_empty());

    assert_eq!(reply(&mut ctx, &mut sink, "click"), "https://cdn.mock/R1");
    assert_eq!(reply(&mut ctx, &mut sink, "analyze"), "4");
}
