use super::*;

use std::sync::Arc;

use crate::component::{Editor, FileUpload, HasText};
use crate::services::page::Page;
use crate::state::test_helpers::{seed_page, test_app_state};

fn form(pairs: &[(&str, &str)]) -> Form<Vec<(String, String)>> {
    Form(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    )
}

async fn page_with_editor(state: &AppState) -> (Arc<Page>, crate::component::Handle<Editor>) {
    let page = seed_page(state).await;
    let editor = page.create(|id| Editor::new(id, "prior"));
    (page, editor)
}

#[test]
fn sync_error_status_mapping() {
    let too_large = SyncError::Intake(IntakeError::TooLarge { limit: 1 });
    assert_eq!(sync_error_to_status(&too_large), StatusCode::PAYLOAD_TOO_LARGE);

    let io = SyncError::Intake(IntakeError::Write(io::Error::other("disk full")));
    assert_eq!(sync_error_to_status(&io), StatusCode::INTERNAL_SERVER_ERROR);

    let bad = SyncError::Notification(NotificationError::Missing("cid"));
    assert_eq!(sync_error_to_status(&bad), StatusCode::BAD_REQUEST);
}

#[test]
fn error_body_carries_code() {
    let body = ErrorBody::from_error(&NotificationError::Missing("et"));
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["code"], "E_MISSING_PARAM");
    assert_eq!(json["message"], "missing parameter: et");
    assert!(json.get("retryable").is_none());
}

#[test]
fn batch_value_shapes() {
    let one: BatchEvent = serde_json::from_str(r#"{"et":11,"cid":1,"cval":"x"}"#).unwrap();
    let (_, payload) = one.into_entry().unwrap();
    assert_eq!(payload.values.extract("cval"), crate::payload::Extracted::Value("x"));

    let empty: BatchEvent = serde_json::from_str(r#"{"et":11,"cid":1,"cval":[]}"#).unwrap();
    let (_, payload) = empty.into_entry().unwrap();
    assert_eq!(payload.values.extract("cval"), crate::payload::Extracted::ExplicitEmpty);

    let absent: BatchEvent = serde_json::from_str(r#"{"et":11,"cid":1,"fcid":2}"#).unwrap();
    let (n, payload) = absent.into_entry().unwrap();
    assert_eq!(payload.values.extract("cval"), crate::payload::Extracted::Absent);
    assert_eq!(n.focused_component_id, Some(ComponentId::from_raw(2)));
}

#[test]
fn batch_entry_rejects_unknown_kind() {
    let bad: BatchEvent = serde_json::from_str(r#"{"et":42,"cid":1}"#).unwrap();
    assert!(matches!(bad.into_entry(), Err(NotificationError::Invalid { param: "et", .. })));
}

#[tokio::test]
async fn post_sync_applies_value() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let (page, editor) = page_with_editor(&state).await;
    let (pid, cid) = (page.id().to_string(), editor.id().to_string());

    let Json(resp) = post_sync(
        State(state.clone()),
        form(&[("pid", &pid), ("et", "11"), ("cid", &cid), ("cval", "hello")]),
    )
    .await
    .unwrap();

    assert_eq!(resp.status, SyncOutcome::Applied);
    assert_eq!(editor.read(|e| e.text().to_string()), "hello");
}

#[tokio::test]
async fn post_sync_unknown_page_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let pid = Uuid::new_v4().to_string();

    let err = post_sync(State(state), form(&[("pid", &pid), ("et", "11"), ("cid", "1")]))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.body.code, "E_PAGE_NOT_FOUND");
}

#[tokio::test]
async fn post_sync_bad_event_kind_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let (page, _) = page_with_editor(&state).await;
    let pid = page.id().to_string();

    let err = post_sync(State(state), form(&[("pid", &pid), ("et", "zz"), ("cid", "1")]))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.body.code, "E_INVALID_PARAM");
}

#[tokio::test]
async fn post_sync_stale_component_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let (page, _) = page_with_editor(&state).await;
    let pid = page.id().to_string();

    let Json(resp) = post_sync(State(state), form(&[("pid", &pid), ("et", "11"), ("cid", "999"), ("cval", "x")]))
        .await
        .unwrap();
    assert_eq!(resp.status, SyncOutcome::Dropped);
}

#[tokio::test]
async fn post_sync_without_value_keeps_text() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let (page, editor) = page_with_editor(&state).await;
    let (pid, cid) = (page.id().to_string(), editor.id().to_string());

    let Json(resp) = post_sync(State(state), form(&[("pid", &pid), ("et", "11"), ("cid", &cid)]))
        .await
        .unwrap();
    assert_eq!(resp.status, SyncOutcome::Unchanged);
    assert_eq!(editor.read(|e| e.text().to_string()), "prior");
}

#[tokio::test]
async fn post_sync_batch_reports_each_entry() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let (page, editor) = page_with_editor(&state).await;
    let upload = page.create(FileUpload::new);

    let body: BatchRequest = serde_json::from_value(serde_json::json!({
        "pid": page.id(),
        "events": [
            { "et": 11, "cid": editor.id(), "cval": [] },
            { "et": 99, "cid": editor.id() },
            { "et": 9, "cid": editor.id(), "cval": "ignored" },
            { "et": 11, "cid": upload.id() },
        ]
    }))
    .unwrap();

    let Json(resp) = post_sync_batch(State(state), Json(body)).await.unwrap();
    let json = serde_json::to_value(&resp).unwrap();

    assert_eq!(json["results"][0]["status"], "applied");
    assert_eq!(json["results"][1]["error"]["code"], "E_INVALID_PARAM");
    assert_eq!(json["results"][2]["status"], "ignored");
    assert_eq!(json["results"][3]["status"], "unchanged");
    assert_eq!(editor.read(|e| e.text().to_string()), "");
}

#[tokio::test]
async fn post_sync_batch_unknown_page_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_app_state(dir.path());
    let body = BatchRequest { pid: Uuid::new_v4(), events: Vec::new() };

    let err = post_sync_batch(State(state), Json(body)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[test]
fn upload_failure_body_is_generic() {
    let (status, Json(body)) = UploadResponse::failed(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "uploaded": false, "error": "upload failed" }));
}
