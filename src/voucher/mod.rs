//! Voucher module - business logic for turning journal lines into printable
//! vouchers.
//!
//! - `layout` computes wrapped cells and shared row heights
//! - `pdf` draws the layout onto an A4 page with `printpdf`
//! - `html` renders the same layout as an HTML preview fragment
//! - `archive` bundles one PDF per voucher into a ZIP
//! - `terbilang` spells amounts out in Indonesian

pub mod archive;
pub mod common;
pub mod html;
pub mod layout;
pub mod pdf;
pub mod settings;
pub mod terbilang;
pub mod traits;

pub use archive::{render_archive, VoucherArchive};
pub use html::HtmlVoucherRenderer;
pub use pdf::PdfVoucherRenderer;
pub use settings::{
    Align, ColumnKey, ColumnSpec, DescriptionPlacement, VoucherSettings, VoucherSettingsInput,
};
pub use terbilang::{terbilang, terbilang_rupiah};
pub use traits::VoucherRenderer;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::journal::{JournalLine, TransactionDate};
use common::sanitize_filename;

/// Errors that can occur while producing a voucher document.
#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("failed to build PDF document: {0}")]
    Pdf(String),
    #[error("failed to write voucher archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Column sums of one voucher. Debit and credit are summed independently;
/// their equality is not checked.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub struct VoucherTotals {
    pub debit: u64,
    pub credit: u64,
}

impl VoucherTotals {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a JournalLine>) -> Self {
        lines
            .into_iter()
            .fold(VoucherTotals::default(), |acc, line| VoucherTotals {
                debit: acc.debit.saturating_add(line.debit),
                credit: acc.credit.saturating_add(line.credit),
            })
    }

    /// Amount spelled out on the voucher: the debit total, or the credit
    /// total when no debit was posted.
    pub fn words_amount(&self) -> u64 {
        if self.debit != 0 {
            self.debit
        } else {
            self.credit
        }
    }
}

/// The lines sharing one voucher id. Borrowed from the caller's line table
/// for the duration of a single render.
#[derive(Debug, Clone)]
pub struct Voucher<'a> {
    pub id: &'a str,
    pub lines: Vec<&'a JournalLine>,
    pub totals: VoucherTotals,
}

impl<'a> Voucher<'a> {
    /// Select the lines of `voucher_id`, in input order. Returns `None` when
    /// no line matches.
    pub fn select(lines: &'a [JournalLine], voucher_id: &str) -> Option<Voucher<'a>> {
        let target = voucher_id.trim();
        let selected: Vec<&JournalLine> = lines
            .iter()
            .filter(|line| line.voucher_id == target)
            .collect();
        let first: &'a JournalLine = selected.first().copied()?;

        Some(Voucher {
            id: first.voucher_id.as_str(),
            totals: VoucherTotals::from_lines(selected.iter().copied()),
            lines: selected,
        })
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.lines.iter().find_map(|line| match &line.date {
            TransactionDate::Parsed(date) => Some(*date),
            _ => None,
        })
    }

    /// Description of the first line, if it is not blank.
    pub fn first_description(&self) -> Option<&'a str> {
        let first: &'a JournalLine = self.lines.first().copied()?;
        let description = first.description.trim();
        if description.is_empty() {
            None
        } else {
            Some(description)
        }
    }

    /// `Terbilang` text for the voucher total.
    pub fn amount_in_words(&self) -> String {
        terbilang_rupiah(self.totals.words_amount())
    }
}

/// Why a document was produced in degraded form.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DegradedReason {
    LogoSkipped(String),
}

/// Whether the document contains everything that was asked for.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(tag = "status", content = "reasons", rename_all = "snake_case")]
pub enum RenderStatus {
    #[default]
    Complete,
    Degraded(Vec<DegradedReason>),
}

impl RenderStatus {
    pub fn from_reasons(reasons: Vec<DegradedReason>) -> Self {
        if reasons.is_empty() {
            RenderStatus::Complete
        } else {
            RenderStatus::Degraded(reasons)
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RenderStatus::Degraded(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::Complete => "complete",
            RenderStatus::Degraded(_) => "degraded",
        }
    }
}

/// Output of a [`VoucherRenderer`].
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
    pub status: RenderStatus,
}

/// A finished voucher document ready to be offered for download.
#[derive(Debug, Clone)]
pub struct RenderedVoucher {
    pub voucher_id: String,
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub totals: VoucherTotals,
    pub status: RenderStatus,
}

/// Render `voucher_id` with `renderer`. An id without lines yields `Ok(None)`.
pub fn render_voucher<R: VoucherRenderer + ?Sized>(
    renderer: &R,
    lines: &[JournalLine],
    voucher_id: &str,
    settings: &VoucherSettings,
) -> Result<Option<RenderedVoucher>, VoucherError> {
    let voucher = match Voucher::select(lines, voucher_id) {
        Some(voucher) => voucher,
        None => {
            debug!("Voucher '{}' has no lines, nothing to render", voucher_id);
            return Ok(None);
        }
    };

    let document = renderer.render(&voucher, settings)?;
    if let RenderStatus::Degraded(reasons) = &document.status {
        warn!("Voucher '{}' rendered in degraded form: {:?}", voucher.id, reasons);
    }

    let filename = format!(
        "voucher-{}.{}",
        sanitize_filename(voucher.id, "voucher"),
        document.extension
    );
    info!(
        "Rendered voucher '{}' ({} lines, {} bytes) as {}",
        voucher.id,
        voucher.lines.len(),
        document.bytes.len(),
        filename
    );

    Ok(Some(RenderedVoucher {
        voucher_id: voucher.id.to_string(),
        filename,
        content_type: document.content_type,
        bytes: document.bytes,
        totals: voucher.totals,
        status: document.status,
    }))
}

/// Render one voucher as PDF.
pub fn render_pdf(
    lines: &[JournalLine],
    voucher_id: &str,
    settings: &VoucherSettings,
) -> Result<Option<RenderedVoucher>, VoucherError> {
    render_voucher(&PdfVoucherRenderer, lines, voucher_id, settings)
}

/// Render one voucher as an HTML preview fragment.
pub fn render_html(
    lines: &[JournalLine],
    voucher_id: &str,
    settings: &VoucherSettings,
) -> Result<Option<RenderedVoucher>, VoucherError> {
    render_voucher(&HtmlVoucherRenderer, lines, voucher_id, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lines() -> Vec<JournalLine> {
        vec![
            JournalLine::new("V1", "101", "Kas", "Opening", 500_000, 0),
            JournalLine::new("V2", "102", "Bank", "Transfer", 75_000, 0),
            JournalLine::new("V1", "201", "Modal", "Opening", 0, 500_000),
        ]
    }

    #[test]
    fn test_select_filters_and_sums() {
        let lines = sample_lines();
        let voucher = Voucher::select(&lines, " V1 ").unwrap();
        assert_eq!(voucher.id, "V1");
        assert_eq!(voucher.lines.len(), 2);
        assert_eq!(voucher.totals, VoucherTotals { debit: 500_000, credit: 500_000 });
    }

    #[test]
    fn test_select_unknown_is_none() {
        assert!(Voucher::select(&sample_lines(), "V404").is_none());
        assert!(Voucher::select(&[], "V1").is_none());
    }

    #[test]
    fn test_words_amount_falls_back_to_credit() {
        let totals = VoucherTotals { debit: 0, credit: 1_000 };
        assert_eq!(totals.words_amount(), 1_000);
        let totals = VoucherTotals { debit: 2_000, credit: 1_000 };
        assert_eq!(totals.words_amount(), 2_000);
    }

    #[test]
    fn test_first_description_skips_blank() {
        let lines = vec![JournalLine::new("V1", "101", "Kas", "  ", 1, 0)];
        let voucher = Voucher::select(&lines, "V1").unwrap();
        assert_eq!(voucher.first_description(), None);
    }

    #[test]
    fn test_render_status_from_reasons() {
        assert_eq!(RenderStatus::from_reasons(vec![]), RenderStatus::Complete);
        let degraded = RenderStatus::from_reasons(vec![DegradedReason::LogoSkipped("bad".into())]);
        assert!(degraded.is_degraded());
        assert_eq!(degraded.as_str(), "degraded");
    }
}
