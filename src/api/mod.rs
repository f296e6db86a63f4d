//! HTTP surface: upload a journal, list its vouchers, and download them as
//! HTML preview, PDF or ZIP.

pub mod handlers;
pub mod models;
pub mod multipart_parser;

pub use handlers::config;

use crate::config::AppConfig;
use crate::voucher::VoucherSettings;

/// Shared, read-only request state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub voucher_defaults: VoucherSettings,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(voucher_defaults: VoucherSettings, max_upload_bytes: usize) -> Self {
        Self {
            voucher_defaults,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.voucher_defaults.clone(), config.max_upload_bytes)
    }
}
