use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use futures::StreamExt;
use log::debug;
use sanitize_filename::sanitize;

use crate::voucher::{VoucherSettings, VoucherSettingsInput};
use crate::ErrorResponse;

#[derive(Debug, Default)]
pub struct ParsedVoucherRequest {
    pub file_data: Vec<u8>,
    pub filename: String,
    pub voucher_id: Option<String>,
    pub voucher_ids: Vec<String>,
    pub settings: Option<VoucherSettingsInput>,
    pub logo: Option<Vec<u8>>,
}

impl ParsedVoucherRequest {
    /// Ids named by the request: `voucher_ids` when given, otherwise the
    /// single `voucher_id`.
    pub fn requested_ids(&self) -> Vec<String> {
        if !self.voucher_ids.is_empty() {
            return self.voucher_ids.clone();
        }
        self.voucher_id.iter().cloned().collect()
    }

    /// Merge the request's overrides and uploaded logo onto the server
    /// defaults.
    pub fn resolve_settings(&mut self, defaults: &VoucherSettings) -> VoucherSettings {
        let mut settings = match self.settings.take() {
            Some(input) => input.apply(defaults),
            None => defaults.clone(),
        };
        if let Some(logo) = self.logo.take() {
            settings.logo = Some(logo);
        }
        settings
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("No spreadsheet uploaded in the 'file' field")]
    MissingFile,
    #[error("Upload exceeds the limit of {0} bytes")]
    TooLarge(usize),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
    #[error("Invalid settings: {0}")]
    SerializationError(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::TooLarge(_) => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &format!("{}", error))),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error))),
        }
    }
}

/// Accumulates form fields in arrival order. Unknown fields are ignored and
/// a repeated field replaces the earlier value.
#[derive(Debug, Default)]
pub struct VoucherFormBuilder {
    request: ParsedVoucherRequest,
    has_file: bool,
}

impl VoucherFormBuilder {
    pub fn accept(
        &mut self,
        name: &str,
        filename: Option<&str>,
        data: Vec<u8>,
    ) -> Result<(), MultipartParseError> {
        match name {
            "file" => {
                // Browsers send an empty part when no file was chosen.
                if data.is_empty() && filename.map_or(true, |f| f.is_empty()) {
                    return Ok(());
                }
                self.request.filename = filename
                    .map(|f| sanitize(f))
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| "journal.dat".to_string());
                self.request.file_data = data;
                self.has_file = true;
            }
            "voucher_id" => {
                let value = text_value(data)?;
                self.request.voucher_id = Some(value).filter(|v| !v.is_empty());
            }
            "voucher_ids" => {
                let value = text_value(data)?;
                self.request.voucher_ids = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "settings" => {
                let value = text_value(data)?;
                if value.is_empty() {
                    self.request.settings = None;
                } else {
                    let settings: VoucherSettingsInput = serde_json::from_str(&value)
                        .map_err(|e| MultipartParseError::SerializationError(e.to_string()))?;
                    self.request.settings = Some(settings);
                }
            }
            "logo" => {
                self.request.logo = Some(data).filter(|d| !d.is_empty());
            }
            other => {
                debug!("Ignoring unknown multipart field '{}'", other);
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<ParsedVoucherRequest, MultipartParseError> {
        if !self.has_file {
            return Err(MultipartParseError::MissingFile);
        }
        Ok(self.request)
    }
}

fn text_value(data: Vec<u8>) -> Result<String, MultipartParseError> {
    let value =
        String::from_utf8(data).map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
    Ok(value.trim().to_string())
}

pub struct MultipartParser;

impl MultipartParser {
    /// Read the journal upload form. `max_bytes` bounds the sum of all field
    /// sizes.
    pub async fn parse_voucher_multipart(
        mut multipart: Multipart,
        max_bytes: usize,
    ) -> Result<ParsedVoucherRequest, MultipartParseError> {
        let mut builder = VoucherFormBuilder::default();
        let mut total = 0usize;

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let filename = content_disposition.get_filename().map(|s| s.to_string());

            let data = read_field(&mut field, &mut total, max_bytes).await?;
            builder.accept(&name, filename.as_deref(), data)?;
        }

        builder.finish()
    }
}

async fn read_field(
    field: &mut Field,
    total: &mut usize,
    max_bytes: usize,
) -> Result<Vec<u8>, MultipartParseError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        *total += data_chunk.len();
        if *total > max_bytes {
            return Err(MultipartParseError::TooLarge(max_bytes));
        }
        buffer.extend_from_slice(&data_chunk);
    }
    Ok(buffer)
}
