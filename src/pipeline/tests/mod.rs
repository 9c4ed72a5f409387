//! End-to-end pipeline tests against a mock HTTP server

use crate::config::Config;
use crate::error::{Error, TransportError};
use crate::pipeline::DownloadPipeline;
use crate::types::{JobOutcome, ProgressEvent};
use image::{Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 60, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_with_encoder(image::codecs::png::PngEncoder::new(&mut out))
        .unwrap();
    out.into_inner()
}

fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.workspace.root = root.to_path_buf();
    config
}

async fn mount_page(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path("/chapter"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, image_path: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

fn member_names(archive_data: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive_data)).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn workspace_is_empty(root: &Path) -> bool {
    !root.exists() || std::fs::read_dir(root).unwrap().next().is_none()
}

#[tokio::test]
async fn mixed_page_succeeds_with_filtered_candidates() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    // logo.png has no digit in its base name and must be excluded.
    mount_page(
        &server,
        r#"<html><body>
            <img src="a1.jpg">
            <img src="logo.png">
            <img src="b2.jpeg">
        </body></html>"#,
    )
    .await;
    mount_image(&server, "/a1.jpg", png_bytes(100, 100)).await;
    mount_image(&server, "/b2.jpeg", png_bytes(50, 80)).await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let url = format!("{}/chapter", server.uri());

    let outcome = pipeline.run(&url).await.unwrap();

    let archive = match &outcome {
        JobOutcome::Success { archive } => archive,
        other => panic!("expected full success, got {other:?}"),
    };
    assert_eq!(
        member_names(&archive.data),
        vec!["0000-a1.jpg", "0002-b2.jpg"],
        "members carry original-enumeration indices 0 and 2"
    );
    assert!(workspace_is_empty(tmp.path()), "workspace must end empty");
}

#[tokio::test]
async fn failed_image_fetch_yields_partial_success() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(&server, r#"<img src="p1.jpg"><img src="p2.jpg">"#).await;
    mount_image(&server, "/p1.jpg", png_bytes(60, 60)).await;
    Mock::given(method("GET"))
        .and(path("/p2.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let mut events = pipeline.subscribe();

    let outcome = pipeline
        .run(&format!("{}/chapter", server.uri()))
        .await
        .unwrap();

    match &outcome {
        JobOutcome::PartialSuccess { archive, failed } => {
            assert_eq!(*failed, 1);
            assert_eq!(member_names(&archive.data), vec!["0000-p1.jpg"]);
        }
        other => panic!("expected partial success, got {other:?}"),
    }

    let events = drain_events(&mut events);
    assert_eq!(events.len(), 2, "one event per resolved task");
    assert!(events[0].error.is_none());
    assert_eq!(events[0].completed, 1);
    assert_eq!(events[0].last_item, "0000-p1.jpg");
    let failure = events[1].error.as_deref().unwrap();
    assert!(failure.contains("404"), "got: {failure}");
    assert_eq!(events[1].completed, 1, "failures do not advance completed");
    assert_eq!(events[1].total, 2);
}

#[tokio::test]
async fn undecodable_image_is_isolated_as_processing_failure() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(&server, r#"<img src="p1.jpg"><img src="p2.jpg">"#).await;
    mount_image(&server, "/p1.jpg", b"this is not a jpeg".to_vec()).await;
    mount_image(&server, "/p2.jpg", png_bytes(40, 40)).await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let mut events = pipeline.subscribe();

    let outcome = pipeline
        .run(&format!("{}/chapter", server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.failed_count(), 1);
    assert_eq!(member_names(&outcome.archive().data), vec!["0001-p2.jpg"]);

    let events = drain_events(&mut events);
    assert!(
        events[0]
            .error
            .as_deref()
            .unwrap()
            .contains("decode"),
        "first event must carry the decode failure"
    );
}

#[tokio::test]
async fn page_fetch_failure_is_fatal_and_leaves_no_files() {
    let tmp = tempfile::tempdir().unwrap();
    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();

    // Nothing listens on this port.
    let err = pipeline.run("http://127.0.0.1:1/chapter").await.unwrap_err();

    assert!(
        matches!(err, Error::Transport(TransportError::Request { .. })),
        "got {err:?}"
    );
    assert!(workspace_is_empty(tmp.path()));
}

#[tokio::test]
async fn page_without_qualifying_images_is_an_explicit_failure() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    // Only digit-free chrome: no candidates, and no divide-by-zero either.
    mount_page(&server, r#"<img src="logo.png"><p>text</p>"#).await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let err = pipeline
        .run(&format!("{}/chapter", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoImagesFound), "got {err:?}");
    assert!(workspace_is_empty(tmp.path()));
}

#[tokio::test]
async fn non_http_input_is_rejected_before_any_network_io() {
    let tmp = tempfile::tempdir().unwrap();
    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();

    for bad in ["ftp://example.com/x", "example.com/chapter", "not a url"] {
        let err = pipeline.run(bad).await.unwrap_err();
        assert!(matches!(err, Error::Input(_)), "{bad}: got {err:?}");
    }
}

#[tokio::test]
async fn all_images_failing_is_a_job_failure_with_clean_workspace() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(&server, r#"<img src="p1.jpg">"#).await;
    Mock::given(method("GET"))
        .and(path("/p1.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let err = pipeline
        .run(&format!("{}/chapter", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::AllImagesFailed { total: 1 }),
        "got {err:?}"
    );
    assert!(workspace_is_empty(tmp.path()));
}

#[tokio::test]
async fn cancelled_job_produces_no_archive_and_cleans_up() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(&server, r#"<img src="p1.jpg">"#).await;
    mount_image(&server, "/p1.jpg", png_bytes(30, 30)).await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = pipeline
        .run_with_cancel(&format!("{}/chapter", server.uri()), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled), "got {err:?}");
    assert!(workspace_is_empty(tmp.path()));
}

#[tokio::test]
async fn progress_events_advance_monotonically() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        r#"<img src="p1.jpg"><img src="p2.jpg"><img src="p3.jpg">"#,
    )
    .await;
    for name in ["/p1.jpg", "/p2.jpg", "/p3.jpg"] {
        mount_image(&server, name, png_bytes(20, 20)).await;
    }

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let mut events = pipeline.subscribe();

    pipeline
        .run(&format!("{}/chapter", server.uri()))
        .await
        .unwrap();

    let events = drain_events(&mut events);
    assert_eq!(events.len(), 3);
    let completed: Vec<usize> = events.iter().map(|e| e.completed).collect();
    assert_eq!(completed, vec![1, 2, 3]);
    assert!(events.iter().all(|e| e.total == 3));
}

#[tokio::test]
async fn repeated_runs_produce_structurally_equal_archives() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(&server, r#"<img src="p1.jpg"><img src="p2.jpg">"#).await;
    mount_image(&server, "/p1.jpg", png_bytes(64, 64)).await;
    mount_image(&server, "/p2.jpg", png_bytes(32, 48)).await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let url = format!("{}/chapter", server.uri());

    let first = pipeline.run(&url).await.unwrap();
    let second = pipeline.run(&url).await.unwrap();

    assert_eq!(
        member_names(&first.archive().data),
        member_names(&second.archive().data)
    );
    assert_ne!(
        first.archive().file_name,
        second.archive().file_name,
        "archive names differ by job id suffix"
    );
}

#[tokio::test]
async fn processed_members_are_downscaled_jpegs() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_page(&server, r#"<img src="p1.png">"#).await;
    mount_image(&server, "/p1.png", png_bytes(100, 100)).await;

    let pipeline = DownloadPipeline::new(test_config(tmp.path())).unwrap();
    let outcome = pipeline
        .run(&format!("{}/chapter", server.uri()))
        .await
        .unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(outcome.archive().data.clone())).unwrap();
    let mut member = zip.by_index(0).unwrap();
    let mut data = Vec::new();
    std::io::Read::read_to_end(&mut member, &mut data).unwrap();

    assert_eq!(
        image::guess_format(&data).unwrap(),
        image::ImageFormat::Jpeg
    );
    let img = image::load_from_memory(&data).unwrap();
    assert_eq!((img.width(), img.height()), (80, 80));
}
