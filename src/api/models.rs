use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::journal::{JournalLine, TransactionDate};
use crate::voucher::VoucherTotals;

/// Fields accepted by every journal endpoint (`multipart/form-data`).
#[derive(Debug, Deserialize, ToSchema)]
pub struct JournalUploadRequest {
    /// Spreadsheet (`.xlsx`, `.xls`, `.ods`) or delimited text (`.csv`).
    #[allow(unused)]
    pub file: Vec<u8>,
    #[allow(unused)]
    #[schema(example = "JV-2024-001")]
    pub voucher_id: Option<String>,
    /// Comma-separated ids for the archive endpoint.
    #[allow(unused)]
    #[schema(example = "JV-2024-001,JV-2024-002")]
    pub voucher_ids: Option<String>,
    /// JSON encoded `VoucherSettingsInput`.
    #[allow(unused)]
    #[schema(example = r#"{"company_name": "PT Maju Jaya", "approver_name": "Budi"}"#)]
    pub settings: Option<String>,
    /// Logo image, overrides the server default.
    #[allow(unused)]
    pub logo: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct VoucherSummary {
    #[schema(example = "JV-2024-001")]
    pub voucher_id: String,
    #[schema(example = 2)]
    pub line_count: usize,
    /// First parsed transaction date, `dd/mm/yyyy`.
    #[schema(example = "05/01/2024")]
    pub date: Option<String>,
    pub totals: VoucherTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoucherListResponse {
    #[schema(example = "jurnal-januari.xlsx")]
    pub filename: String,
    pub line_count: usize,
    /// Canonical names of columns that were not found in the header row.
    #[schema(example = json!(["Deskripsi"]))]
    pub missing_columns: Vec<String>,
    pub vouchers: Vec<VoucherSummary>,
}

impl VoucherSummary {
    /// Summaries for `ids`, in the order given.
    pub fn collect(lines: &[JournalLine], ids: &[String]) -> Vec<VoucherSummary> {
        ids.iter()
            .map(|id| {
                let selected: Vec<&JournalLine> =
                    lines.iter().filter(|line| &line.voucher_id == id).collect();
                let date = selected.iter().find_map(|line| match &line.date {
                    TransactionDate::Parsed(_) => Some(line.date.display()),
                    _ => None,
                });
                VoucherSummary {
                    voucher_id: id.clone(),
                    line_count: selected.len(),
                    date,
                    totals: VoucherTotals::from_lines(selected.iter().copied()),
                }
            })
            .collect()
    }
}
