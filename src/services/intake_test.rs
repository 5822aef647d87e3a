use super::*;

use axum::body::Bytes;
use futures::stream;

fn store(dir: &tempfile::TempDir) -> TempStore {
    TempStore::new(dir.path().join("tempfiles"))
}

#[tokio::test]
async fn stores_file_under_root_with_sanitized_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let artifact = store
        .intake(FilePart::from_bytes("sample.txt", &b"abc"[..]))
        .await
        .unwrap();

    assert_eq!(artifact.original_name(), "sample.txt");
    assert_eq!(artifact.size(), 3);
    assert!(artifact.stored_path().starts_with(store.root()));
    let file_name = artifact.stored_path().file_name().unwrap().to_str().unwrap();
    assert!(file_name.ends_with("_sample.txt"));
    assert_eq!(file_name.len(), 16 + 1 + "sample.txt".len());
    assert_eq!(tokio::fs::read(artifact.stored_path()).await.unwrap(), b"abc");
}

#[tokio::test]
async fn traversal_names_stay_inside_root() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let artifact = store
        .intake(FilePart::from_bytes("../../etc/passwd", &b"x"[..]))
        .await
        .unwrap();

    assert_eq!(artifact.stored_path().parent(), Some(store.root()));
    assert!(artifact.stored_path().to_str().unwrap().ends_with("_passwd"));
    assert_eq!(artifact.original_name(), "../../etc/passwd");
}

#[tokio::test]
async fn same_name_twice_gets_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let a = store.intake(FilePart::from_bytes("a.txt", &b"1"[..])).await.unwrap();
    let b = store.intake(FilePart::from_bytes("a.txt", &b"2"[..])).await.unwrap();

    assert_ne!(a.stored_path(), b.stored_path());
    assert_eq!(tokio::fs::read(a.stored_path()).await.unwrap(), b"1");
    assert_eq!(tokio::fs::read(b.stored_path()).await.unwrap(), b"2");
}

#[tokio::test]
async fn empty_file_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = store(&dir)
        .intake(FilePart::from_bytes("empty.bin", Vec::new()))
        .await
        .unwrap();
    assert_eq!(artifact.size(), 0);
    assert!(artifact.stored_path().exists());
}

#[tokio::test]
async fn oversize_upload_is_rejected_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).with_max_bytes(Some(4));

    let err = store
        .intake(FilePart::from_bytes("big.bin", &b"123456"[..]))
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::TooLarge { limit: 4 }));
    assert_eq!(err.error_code(), "E_INTAKE_TOO_LARGE");
    let mut entries = tokio::fs::read_dir(store.root()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn stream_error_removes_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let chunks = stream::iter(vec![
        Ok(Bytes::from_static(b"part")),
        Err(io::Error::other("connection reset")),
    ])
    .boxed();

    let err = store
        .intake(FilePart::new("cut.bin", chunks))
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::Read(_)));
    assert!(err.retryable());
    let mut entries = tokio::fs::read_dir(store.root()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn dropped_intake_removes_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    // One chunk arrives, then the client goes silent.
    let chunks = stream::once(async { Ok(Bytes::from_static(b"part")) })
        .chain(stream::pending())
        .boxed();

    let cut = tokio::time::timeout(
        std::time::Duration::from_millis(250),
        store.intake(FilePart::new("stalled.bin", chunks)),
    )
    .await;

    assert!(cut.is_err());
    let mut entries = tokio::fs::read_dir(store.root()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_intakes_share_a_fresh_root() {
    let dir = tempfile::tempdir().unwrap();
    let store = TempStore::new(dir.path().join("nested").join("tempfiles"));
    assert!(!store.root().exists());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .intake(FilePart::from_bytes("same.txt", format!("body {i}").into_bytes()))
                    .await
            })
        })
        .collect();

    let mut paths = std::collections::HashSet::new();
    for task in tasks {
        let artifact = task.await.unwrap().unwrap();
        assert_eq!(artifact.stored_path().parent(), Some(store.root()));
        paths.insert(artifact.stored_path().to_path_buf());
    }
    assert_eq!(paths.len(), 16);
}

#[tokio::test]
async fn discard_deletes_stored_file() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = store(&dir)
        .intake(FilePart::from_bytes("gone.txt", &b"z"[..]))
        .await
        .unwrap();
    let path = artifact.stored_path().to_path_buf();

    artifact.discard().await.unwrap();
    assert!(!path.exists());
}

#[test]
fn sanitize_keeps_last_segment_only() {
    assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_file_name("C:\\Users\\me\\report.pdf"), "report.pdf");
    assert_eq!(sanitize_file_name("dir/"), "upload");
}

#[test]
fn sanitize_replaces_unsafe_characters() {
    assert_eq!(sanitize_file_name("my file (1).txt"), "my_file__1_.txt");
    assert_eq!(sanitize_file_name("a\u{0}b\nc"), "abc");
    assert_eq!(sanitize_file_name("résumé.doc"), "r_sum_.doc");
}

#[test]
fn sanitize_strips_leading_dots_and_falls_back() {
    assert_eq!(sanitize_file_name(".env"), "env");
    assert_eq!(sanitize_file_name(".."), "upload");
    assert_eq!(sanitize_file_name(""), "upload");
}

#[test]
fn sanitize_truncates_long_names() {
    let long = "a".repeat(300);
    assert_eq!(sanitize_file_name(&long).len(), 100);
}
