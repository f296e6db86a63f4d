//! Endpoint tests driving the journal routes through an in-process service.

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::Value;

use common::{company_settings, multipart_body, Part, JOURNAL_CSV};
use jurnal_voucher_server::api::handlers::RENDER_STATUS_HEADER;
use jurnal_voucher_server::{api, AppState, ErrorResponse};

const MAX_UPLOAD: usize = 1024 * 1024;

macro_rules! init_app {
    ($max_upload:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(company_settings(), $max_upload)))
                .service(web::scope("/api").configure(api::config)),
        )
        .await
    };
}

fn post(uri: &str, parts: &[Part<'_>]) -> test::TestRequest {
    let (content_type, body) = multipart_body(parts);
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

fn journal_file() -> Part<'static> {
    Part::file("file", "jurnal.csv", JOURNAL_CSV.as_bytes())
}

#[actix_web::test]
async fn test_list_vouchers() {
    let app = init_app!(MAX_UPLOAD);
    let req = post("/api/journal/vouchers", &[journal_file()]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["filename"], "jurnal.csv");
    assert_eq!(body["line_count"], 4);
    assert_eq!(body["missing_columns"], serde_json::json!([]));
    assert_eq!(body["vouchers"][0]["voucher_id"], "V1");
    assert_eq!(body["vouchers"][0]["totals"]["debit"], 500_000);
    assert_eq!(body["vouchers"][1]["voucher_id"], "V2");
    assert_eq!(body["vouchers"][1]["date"], "06/01/2024");
}

#[actix_web::test]
async fn test_pdf_download() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/pdf",
        &[journal_file(), Part::text("voucher_id", "V1")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    assert_eq!(headers.get(RENDER_STATUS_HEADER).unwrap(), "complete");
    let disposition = headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("voucher-v1.pdf"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn test_preview_uses_request_settings() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/preview",
        &[
            journal_file(),
            Part::text("voucher_id", "V1"),
            Part::text("settings", r#"{"company_name": "CV Sentosa"}"#),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("CV Sentosa"));
    assert!(!html.contains("PT Maju Jaya"));
    assert!(html.contains("Budi&nbsp;Santoso"));
    assert!(html.contains("Terbilang: Lima Ratus Ribu Rupiah"));
}

#[actix_web::test]
async fn test_bad_logo_marks_response_degraded() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/pdf",
        &[
            journal_file(),
            Part::text("voucher_id", "V2"),
            Part::file("logo", "logo.png", b"\x89PNG broken"),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(RENDER_STATUS_HEADER).unwrap(), "degraded");
}

#[actix_web::test]
async fn test_unknown_voucher_is_not_found() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/pdf",
        &[journal_file(), Part::text("voucher_id", "V404")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "NotFound");
    assert!(body.message.contains("V404"));
}

#[actix_web::test]
async fn test_missing_voucher_id_is_bad_request() {
    let app = init_app!(MAX_UPLOAD);
    let req = post("/api/journal/preview", &[journal_file()]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_missing_file_is_bad_request() {
    let app = init_app!(MAX_UPLOAD);
    let req = post("/api/journal/vouchers", &[Part::text("voucher_id", "V1")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "BadRequest");
}

#[actix_web::test]
async fn test_malformed_settings_is_bad_request() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/pdf",
        &[
            journal_file(),
            Part::text("voucher_id", "V1"),
            Part::text("settings", "{\"company_name\": "),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unreadable_workbook_is_bad_request() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/vouchers",
        &[Part::file("file", "jurnal.xlsx", b"PK\x03\x04garbage")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_upload_limit() {
    let app = init_app!(16);
    let req = post("/api/journal/vouchers", &[journal_file()]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn test_archive_of_all_vouchers() {
    let app = init_app!(MAX_UPLOAD);
    let req = post("/api/journal/archive", &[journal_file()]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );

    let body = test::read_body(resp).await;
    let archive = zip::ZipArchive::new(std::io::Cursor::new(body.to_vec())).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["voucher-v1.pdf", "voucher-v2.pdf"]);
}

#[actix_web::test]
async fn test_archive_of_unknown_vouchers_is_not_found() {
    let app = init_app!(MAX_UPLOAD);
    let req = post(
        "/api/journal/archive",
        &[journal_file(), Part::text("voucher_ids", "X1, X2")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_openapi_lists_journal_routes() {
    use utoipa::OpenApi;

    let doc = jurnal_voucher_server::ApiDoc::openapi();
    for path in [
        "/api/journal/vouchers",
        "/api/journal/preview",
        "/api/journal/pdf",
        "/api/journal/archive",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {}", path);
    }
}
