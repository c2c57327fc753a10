//! End-to-end tests for `POST /api/batch/{format}`.

mod helpers;

use std::sync::Arc;

use axum_test::multipart::MultipartForm;
use helpers::fixtures::{self, archive_entries, archive_entry, docx_part, text_part};
use helpers::renderer::RenderCounters;
use helpers::setup_render_app;

#[cfg(unix)]
use helpers::{setup_native_app, setup_native_app_with};

#[cfg(unix)]
#[tokio::test]
async fn test_two_docx_files_come_back_as_pdfs() {
    let app = setup_native_app();
    let form = MultipartForm::new()
        .add_part("files", docx_part("report.docx", vec![7u8; 10 * 1024]))
        .add_part("files", docx_part("summary.docx", vec![9u8; 20 * 1024]));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/zip");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"converted_pdfs.zip\""
    );
    assert_eq!(response.header("x-conversion-strategy"), "native");

    let body = response.as_bytes();
    assert_eq!(archive_entries(body), vec!["report.pdf", "summary.pdf"]);
    assert_eq!(archive_entry(body, "report.pdf").trim(), "converted report.docx to pdf");
    assert!(app.residue().is_empty(), "workspace left behind: {:?}", app.residue());
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_pdf_target_uses_native_filter_extension() {
    let app = setup_native_app();
    let form = MultipartForm::new()
        .add_part("files", docx_part("letter.docx", b"hello".to_vec()))
        .add_part("files", text_part("notes.txt", "plain"));

    let response = app.client().post("/api/batch/odt").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"converted_odts.zip\""
    );
    assert_eq!(
        archive_entries(response.as_bytes()),
        vec!["letter.odt", "notes.odt"]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_same_stem_inputs_get_distinct_entries() {
    let app = setup_native_app();
    let form = MultipartForm::new()
        .add_part("files", docx_part("a.docx", b"one".to_vec()))
        .add_part("files", text_part("a.txt", "two"));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(archive_entries(response.as_bytes()), vec!["a.pdf", "a_1.pdf"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_zero_files_is_bad_request() {
    let app = setup_native_app();
    let form = MultipartForm::new().add_text("note", "nothing attached");

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No files provided");
    assert_eq!(body["code"], "NO_FILES");
    assert!(app.residue().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_one_failing_file_fails_whole_batch() {
    let app = setup_native_app();
    let form = MultipartForm::new()
        .add_part("files", docx_part("good.docx", b"fine".to_vec()))
        .add_part("files", docx_part("bad.docx", b"FAIL here".to_vec()))
        .add_part("files", docx_part("late.docx", b"fine too".to_vec()));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 500);
    assert_ne!(response.header("content-type"), "application/zip");
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONVERSION_FAILED");
    assert!(body["error"].as_str().unwrap().contains("bad.docx"));
    assert!(app.residue().is_empty(), "workspace left behind: {:?}", app.residue());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let app = setup_native_app();
    let form = MultipartForm::new().add_part("files", docx_part("a.docx", b"x".to_vec()));

    let response = app.client().post("/api/batch/png").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
}

#[cfg(unix)]
#[tokio::test]
async fn test_too_many_files_is_rejected() {
    let app = setup_native_app_with(|config| config.max_files_per_batch = 2);
    let form = MultipartForm::new()
        .add_part("files", text_part("1.txt", "a"))
        .add_part("files", text_part("2.txt", "b"))
        .add_part("files", text_part("3.txt", "c"));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "BATCH_SIZE_EXCEEDED");
    assert!(app.residue().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_disallowed_extension_is_rejected() {
    let app = setup_native_app();
    let form = MultipartForm::new().add_part(
        "files",
        axum_test::multipart::Part::bytes(bytes::Bytes::from_static(b"MZ"))
            .file_name("setup.exe")
            .mime_type("application/octet-stream"),
    );

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[cfg(unix)]
#[tokio::test]
async fn test_oversized_file_is_413() {
    let app = setup_native_app_with(|config| config.max_document_size_bytes = 16);
    let form = MultipartForm::new().add_part("files", text_part("big.txt", &"x".repeat(64)));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 413);
}

#[cfg(unix)]
#[tokio::test]
async fn test_busy_server_returns_503_without_workspace() {
    let app = setup_native_app_with(|config| config.max_concurrent_batches = 1);
    let _held = app.state.admission.try_admit().unwrap();
    let form = MultipartForm::new().add_part("files", docx_part("a.docx", b"x".to_vec()));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 503);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SERVER_BUSY");
    assert_eq!(body["recoverable"], true);
    assert!(app.residue().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_permit_released_after_batch() {
    let app = setup_native_app_with(|config| config.max_concurrent_batches = 1);

    for _ in 0..2 {
        let form = MultipartForm::new().add_part("files", text_part("a.txt", "x"));
        let response = app.client().post("/api/batch/pdf").multipart(form).await;
        assert_eq!(response.status_code(), 200);
    }
    assert_eq!(app.state.admission.in_flight(), 0);
}

#[tokio::test]
async fn test_headless_strategy_renders_with_one_browser_session() {
    let counters = Arc::new(RenderCounters::default());
    let app = setup_render_app(counters.clone());
    let form = MultipartForm::new()
        .add_part(
            "files",
            docx_part("memo.docx", fixtures::create_test_docx(&["Quarterly memo"])),
        )
        .add_part("files", text_part("readme.txt", "a < b"));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("x-conversion-strategy"), "render");
    assert_eq!(
        archive_entries(response.as_bytes()),
        vec!["memo.pdf", "readme.pdf"]
    );

    assert_eq!(counters.sessions(), 1);
    assert_eq!(counters.pages(), 2);
    assert_eq!(counters.closed(), 1);
    let html = counters.html.lock().unwrap();
    assert!(html[0].contains("Quarterly memo"));
    assert!(html[1].contains("a &lt; b"));
    assert!(app.residue().is_empty());
}

#[tokio::test]
async fn test_headless_render_failure_stops_batch() {
    let counters = Arc::new(RenderCounters::default());
    let app = setup_render_app(counters.clone());
    let form = MultipartForm::new()
        .add_part("files", text_part("one.txt", "BOOM"))
        .add_part("files", text_part("two.txt", "never rendered"));

    let response = app.client().post("/api/batch/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(counters.pages(), 1);
    assert_eq!(counters.closed(), 1);
    assert!(app.residue().is_empty());
}

#[tokio::test]
async fn test_headless_strategy_cannot_produce_office_formats() {
    let counters = Arc::new(RenderCounters::default());
    let app = setup_render_app(counters.clone());
    let form = MultipartForm::new().add_part("files", text_part("a.txt", "x"));

    let response = app.client().post("/api/batch/docx").multipart(form).await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONVERTER_UNAVAILABLE");
    assert_eq!(counters.sessions(), 0);
    assert!(app.residue().is_empty());
}

#[tokio::test]
async fn test_bodiless_post_is_json_no_files() {
    let app = setup_render_app(Arc::new(RenderCounters::default()));

    let response = app.client().post("/api/batch/pdf").await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No files provided");
    assert_eq!(body["code"], "NO_FILES");
    assert!(app.residue().is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_json_invalid_input() {
    let app = setup_render_app(Arc::new(RenderCounters::default()));

    let response = app
        .client()
        .post("/api/batch/pdf")
        .json(&serde_json::json!({ "files": ["a.docx"] }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_bodiless_post_with_unknown_format_reports_format() {
    let app = setup_render_app(Arc::new(RenderCounters::default()));

    let response = app.client().post("/api/batch/png").await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
}
