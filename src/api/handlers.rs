use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use thiserror::Error;

use super::models::{JournalUploadRequest, VoucherListResponse, VoucherSummary};
use super::multipart_parser::{MultipartParser, ParsedVoucherRequest};
use super::AppState;
use crate::journal::{normalize, read_table, voucher_ids, ColumnMapping, JournalLine, ReadError};
use crate::voucher::{
    render_archive, render_html, render_pdf, RenderStatus, RenderedVoucher, VoucherError,
    VoucherSettings,
};
use crate::ErrorResponse;

/// Response header carrying `complete` or `degraded`.
pub const RENDER_STATUS_HEADER: &str = "X-Render-Status";

#[derive(Debug, Error)]
enum JournalJobError {
    #[error("Could not read journal: {0}")]
    Read(#[from] ReadError),
    #[error("Could not render voucher: {0}")]
    Render(#[from] VoucherError),
}

impl From<JournalJobError> for HttpResponse {
    fn from(error: JournalJobError) -> Self {
        match error {
            JournalJobError::Read(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string()))
            }
            JournalJobError::Render(_) => {
                error!("{}", error);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal_error(&error.to_string()))
            }
        }
    }
}

/// Parse the upload and resolve its settings against the server defaults.
async fn parse_request(
    payload: Multipart,
    state: &AppState,
) -> Result<(ParsedVoucherRequest, VoucherSettings), HttpResponse> {
    let mut request = MultipartParser::parse_voucher_multipart(payload, state.max_upload_bytes)
        .await
        .map_err(|e| {
            warn!("Rejected journal upload: {}", e);
            HttpResponse::from(e)
        })?;
    let settings = request.resolve_settings(&state.voucher_defaults);
    debug!(
        "Parsed journal upload '{}' ({} bytes)",
        request.filename,
        request.file_data.len()
    );
    Ok((request, settings))
}

/// Run a CPU-bound job on the blocking pool.
async fn run_job<T, F>(job: F) -> Result<T, HttpResponse>
where
    F: FnOnce() -> Result<T, JournalJobError> + Send + 'static,
    T: Send + 'static,
{
    match web::block(job).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => {
            error!("Blocking task failed: {}", e);
            Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Voucher job was cancelled")))
        }
    }
}

fn load_lines(data: &[u8], filename: &str) -> Result<(Vec<JournalLine>, Vec<String>), ReadError> {
    let table = read_table(data, filename)?;
    let missing = ColumnMapping::from_headers(&table.headers)
        .missing_fields()
        .iter()
        .map(|field| field.canonical_header().to_string())
        .collect();
    Ok((normalize(&table), missing))
}

fn single_voucher_id(request: &ParsedVoucherRequest) -> Result<String, HttpResponse> {
    request.voucher_id.clone().ok_or_else(|| {
        HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "The 'voucher_id' field is required",
        ))
    })
}

fn not_found(voucher_id: &str) -> HttpResponse {
    info!("Voucher '{}' has no lines", voucher_id);
    HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
        "Voucher '{}' has no journal lines",
        voucher_id
    )))
}

fn document_response(
    content_type: &str,
    bytes: Vec<u8>,
    status: &RenderStatus,
    attachment: Option<String>,
) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    response
        .content_type(content_type)
        .insert_header((RENDER_STATUS_HEADER, status.as_str()));
    if let Some(filename) = attachment {
        response.insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        });
    }
    response.body(bytes)
}

fn voucher_response(rendered: RenderedVoucher, attachment: bool) -> HttpResponse {
    let filename = attachment.then(|| rendered.filename.clone());
    document_response(
        rendered.content_type,
        rendered.bytes,
        &rendered.status,
        filename,
    )
}

#[utoipa::path(
    context_path = "/api",
    tag = "Journal Voucher",
    post,
    path = "/journal/vouchers",
    request_body(content = inline(JournalUploadRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Vouchers found in the journal", body = VoucherListResponse),
        (status = 400, description = "Malformed upload or unreadable spreadsheet", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn list_vouchers(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing list_vouchers handler");
    let (request, _) = match parse_request(payload, &data).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let filename = request.filename.clone();
    let result = run_job(move || {
        let (lines, missing_columns) = load_lines(&request.file_data, &request.filename)?;
        let ids = voucher_ids(&lines);
        Ok(VoucherListResponse {
            filename: request.filename,
            line_count: lines.len(),
            missing_columns,
            vouchers: VoucherSummary::collect(&lines, &ids),
        })
    })
    .await;

    match result {
        Ok(response) => {
            info!(
                "Journal '{}' holds {} voucher(s) in {} line(s)",
                filename,
                response.vouchers.len(),
                response.line_count
            );
            HttpResponse::Ok().json(response)
        }
        Err(response) => response,
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Journal Voucher",
    post,
    path = "/journal/preview",
    request_body(content = inline(JournalUploadRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "HTML preview of the voucher", content_type = "text/html", body = String),
        (status = 400, description = "Malformed upload or missing voucher_id", body = ErrorResponse),
        (status = 404, description = "Voucher has no journal lines", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn preview_voucher(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing preview_voucher handler");
    render_single(payload, data, false).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Journal Voucher",
    post,
    path = "/journal/pdf",
    request_body(content = inline(JournalUploadRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Voucher PDF", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Malformed upload or missing voucher_id", body = ErrorResponse),
        (status = 404, description = "Voucher has no journal lines", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn download_voucher_pdf(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing download_voucher_pdf handler");
    render_single(payload, data, true).await
}

async fn render_single(payload: Multipart, data: web::Data<AppState>, pdf: bool) -> HttpResponse {
    let (request, settings) = match parse_request(payload, &data).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let voucher_id = match single_voucher_id(&request) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let target = voucher_id.clone();
    let result = run_job(move || {
        let (lines, _) = load_lines(&request.file_data, &request.filename)?;
        let rendered = if pdf {
            render_pdf(&lines, &target, &settings)?
        } else {
            render_html(&lines, &target, &settings)?
        };
        Ok(rendered)
    })
    .await;

    match result {
        Ok(Some(rendered)) => voucher_response(rendered, pdf),
        Ok(None) => not_found(&voucher_id),
        Err(response) => response,
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Journal Voucher",
    post,
    path = "/journal/archive",
    request_body(content = inline(JournalUploadRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "ZIP of voucher PDFs", content_type = "application/zip", body = Vec<u8>),
        (status = 400, description = "Malformed upload or unreadable spreadsheet", body = ErrorResponse),
        (status = 404, description = "None of the requested vouchers has lines", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn download_voucher_archive(
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing download_voucher_archive handler");
    let (request, settings) = match parse_request(payload, &data).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let requested = request.requested_ids();
    let result = run_job(move || {
        let (lines, _) = load_lines(&request.file_data, &request.filename)?;
        let ids = if requested.is_empty() {
            voucher_ids(&lines)
        } else {
            requested
        };
        Ok(render_archive(&lines, &ids, &settings)?)
    })
    .await;

    match result {
        Ok(archive) if archive.is_empty() => {
            info!("No voucher rendered for archive, skipped: {:?}", archive.skipped);
            HttpResponse::NotFound().json(ErrorResponse::not_found(
                "None of the requested vouchers has journal lines",
            ))
        }
        Ok(archive) => {
            if !archive.skipped.is_empty() {
                debug!("Archive skipped empty vouchers: {:?}", archive.skipped);
            }
            document_response(
                "application/zip",
                archive.bytes,
                &archive.status,
                Some(archive.filename),
            )
        }
        Err(response) => response,
    }
}

/// Configure journal voucher routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/journal/vouchers").route(web::post().to(list_vouchers)))
        .service(web::resource("/journal/preview").route(web::post().to(preview_voucher)))
        .service(web::resource("/journal/pdf").route(web::post().to(download_voucher_pdf)))
        .service(
            web::resource("/journal/archive").route(web::post().to(download_voucher_archive)),
        );
}
