//! File relay integration tests: ingestion through the in-memory messenger, retrieval
//! over HTTP.
//!
//! Run with: `cargo test -p filelink-api --test relay_test`

mod helpers;

use axum::http::StatusCode;
use bytes::Bytes;
use filelink_core::keys;
use filelink_core::RemoteFileId;
use filelink_messaging::{AttachmentKind, Handled, MessageId};
use helpers::{link_after, path_of, setup_test_app, BASE_URL, STORAGE_CHAT};

fn pdf_bytes() -> Bytes {
    Bytes::from((0..1024u32).map(|i| (i % 256) as u8).collect::<Vec<u8>>())
}

#[tokio::test]
async fn test_ingest_then_fetch_document() {
    let app = setup_test_app();
    let remote_id = 5_301_234_567_890_123i64;
    let message = app.send_file(
        AttachmentKind::Document,
        remote_id,
        Some("report.pdf"),
        Some("application/pdf"),
        pdf_bytes(),
    );

    assert_eq!(app.ingest(message).await, Handled::Processed);
    assert_eq!(app.state.registry.size().await, 1);

    let reply = app.last_reply();
    let expected_key = format!("890123{}", remote_id);
    assert_eq!(keys::generate(RemoteFileId::new(remote_id)), expected_key);
    let direct = link_after(&reply, "Download: ").expect("reply carries a direct link");
    assert_eq!(direct, format!("{}/file/{}", BASE_URL, expected_key));
    assert!(link_after(&reply, "Watch: ").is_none());

    let response = app.client().get(path_of(&direct)).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"report.pdf\""
    );
    assert_eq!(response.header("content-length"), "1024");
    assert_eq!(response.header("cache-control"), "no-store");
    assert_eq!(response.as_bytes().as_ref(), pdf_bytes().as_ref());
}

#[tokio::test]
async fn test_unknown_key_is_404_on_both_routes() {
    let app = setup_test_app();
    let key = keys::generate(RemoteFileId::new(123_456_789));

    app.client()
        .get(&format!("/file/{}", key))
        .await
        .assert_status_not_found();
    app.client()
        .get(&format!("/watch/{}", key))
        .await
        .assert_status_not_found();
    app.client()
        .get("/file/not-a-key")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_upstream_deletion_is_404_not_500() {
    let app = setup_test_app();
    let message = app.send_file(
        AttachmentKind::Document,
        99_000_111,
        Some("gone.txt"),
        Some("text/plain"),
        Bytes::from_static(b"soon gone"),
    );
    app.ingest(message).await;

    let key = keys::generate(RemoteFileId::new(99_000_111));
    let record = app.state.registry.lookup(&key).await.expect("registered");
    assert!(app
        .messenger
        .delete_message(STORAGE_CHAT, MessageId(record.remote_location_id)));

    app.client()
        .get(&format!("/file/{}", key))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_upstream_failure_is_500_without_details() {
    let app = setup_test_app();
    let message = app.send_file(
        AttachmentKind::Document,
        31_337,
        Some("a.bin"),
        None,
        Bytes::from_static(b"x"),
    );
    app.ingest(message).await;
    app.messenger.set_fail_downloads(true);

    let key = keys::generate(RemoteFileId::new(31_337));
    let response = app.client().get(&format!("/file/{}", key)).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_FAILURE");
    assert!(body.get("details").is_none());
    assert!(!response.text().contains("memory backend"));
}

#[tokio::test]
async fn test_unsupported_kind_is_rejected() {
    let app = setup_test_app();
    let message = app.send_file(
        AttachmentKind::Sticker,
        8_888_888,
        None,
        Some("image/webp"),
        Bytes::from_static(b"sticker"),
    );

    assert_eq!(app.ingest(message).await, Handled::Processed);
    assert!(app.state.registry.is_empty().await);
    assert!(app.messenger.messages(STORAGE_CHAT).is_empty());

    let reply = app.last_reply();
    assert!(reply.contains("Unsupported file type (sticker)"));
}

#[tokio::test]
async fn test_relay_failure_creates_no_record() {
    let app = setup_test_app();
    app.messenger.set_fail_relays(true);
    let message = app.send_file(
        AttachmentKind::Video,
        70_000_007,
        Some("clip.mp4"),
        Some("video/mp4"),
        Bytes::from_static(b"frames"),
    );

    assert_eq!(app.ingest(message).await, Handled::Processed);
    assert!(app.state.registry.is_empty().await);
    assert!(app.last_reply().starts_with("Failed to store the file"));
}

#[tokio::test]
async fn test_concurrent_ingestion_loses_nothing() {
    const N: i64 = 64;
    let app = setup_test_app();

    let messages: Vec<_> = (0..N)
        .map(|i| {
            app.send_file(
                AttachmentKind::Document,
                1_000_000_000 + i,
                Some(&format!("doc-{}.txt", i)),
                Some("text/plain"),
                Bytes::from(format!("payload {}", i)),
            )
        })
        .collect();

    let results =
        futures::future::join_all(messages.into_iter().map(|message| app.ingest(message))).await;
    assert!(results.iter().all(|h| *h == Handled::Processed));
    assert_eq!(app.state.registry.size().await, N as usize);

    for i in 0..N {
        let key = keys::generate(RemoteFileId::new(1_000_000_000 + i));
        let response = app.client().get(&format!("/file/{}", key)).await;
        response.assert_status_ok();
        assert_eq!(response.text(), format!("payload {}", i));
    }
}

#[tokio::test]
async fn test_video_gets_watch_page_with_player() {
    let app = setup_test_app();
    let message = app.send_file(
        AttachmentKind::Video,
        6_600_660_066,
        Some("clip.mp4"),
        Some("video/mp4"),
        Bytes::from_static(b"frames"),
    );
    app.ingest(message).await;

    let reply = app.last_reply();
    let direct = link_after(&reply, "Download: ").expect("direct link");
    let watch = link_after(&reply, "Watch: ").expect("video replies carry a watch link");

    let response = app.client().get(path_of(&watch)).await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<video"));
    assert!(html.contains(&format!("src=\"{}\"", direct)));
}

#[tokio::test]
async fn test_document_watch_page_falls_back_to_download_link() {
    let app = setup_test_app();
    let message = app.send_file(
        AttachmentKind::Document,
        4_040_404,
        Some("notes.txt"),
        Some("text/plain"),
        Bytes::from_static(b"notes"),
    );
    app.ingest(message).await;

    let key = keys::generate(RemoteFileId::new(4_040_404));
    let response = app.client().get(&format!("/watch/{}", key)).await;
    response.assert_status_ok();
    let html = response.text();
    assert!(!html.contains("<video"));
    assert!(!html.contains("<audio"));
    assert!(html.contains(&format!("href=\"{}/file/{}\" download", BASE_URL, key)));
}
