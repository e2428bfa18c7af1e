//! Local media serving integration tests.

mod helpers;

use axum::http::{HeaderName, HeaderValue};
use helpers::{sample_recording, setup_test_app, upload_sample};

fn range(value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("range"),
        HeaderValue::from_static(value),
    )
}

#[tokio::test]
async fn test_full_and_partial_reads() {
    let app = setup_test_app().await;
    let uploaded = upload_sample(&app).await;
    let path = format!("/media/videos/{}.webm", uploaded["videoId"].as_str().unwrap());
    let data = sample_recording();

    let response = app.client().get(&path).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("accept-ranges"), "bytes");
    assert_eq!(
        response.header("cache-control"),
        "public, max-age=31536000, immutable"
    );
    assert_eq!(response.header("content-type"), "video/webm");
    assert_eq!(response.as_bytes().as_ref(), data.as_slice());

    let (name, value) = range("bytes=0-9");
    let response = app.client().get(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), 206);
    assert_eq!(
        response.header("content-range"),
        format!("bytes 0-9/{}", data.len()).as_str()
    );
    assert_eq!(response.header("content-length"), "10");
    assert_eq!(response.as_bytes().as_ref(), &data[0..10]);

    let (name, value) = range("bytes=-5");
    let response = app.client().get(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().as_ref(), &data[data.len() - 5..]);
}

#[tokio::test]
async fn test_unsatisfiable_range() {
    let app = setup_test_app().await;
    let uploaded = upload_sample(&app).await;
    let path = format!("/media/videos/{}.webm", uploaded["videoId"].as_str().unwrap());
    let size = sample_recording().len();

    let (name, value) = range("bytes=999999-");
    let response = app.client().get(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), 416);
    assert_eq!(
        response.header("content-range"),
        format!("bytes */{}", size).as_str()
    );
}

#[tokio::test]
async fn test_traversal_is_forbidden() {
    let app = setup_test_app().await;
    std::fs::write(app.upload_dir.join("secret.txt"), b"top secret").unwrap();

    let response = app.client().get("/media/videos/..%2Fsecret.txt").await;
    assert_eq!(response.status_code(), 403);
    assert_eq!(response.json::<serde_json::Value>()["code"], "forbidden");

    // Raw scratch files live beside the served directory, not inside it
    let response = app.client().get("/media/videos/..%2Fraw%2Fany.webm").await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let app = setup_test_app().await;

    let response = app.client().get("/media/videos/nothing-here.webm").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<serde_json::Value>()["code"], "not_found");
}
