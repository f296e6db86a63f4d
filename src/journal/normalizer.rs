//! Row normalizer.
//!
//! Maps heterogeneous spreadsheet headers (case/whitespace variants and
//! Indonesian/English aliases such as "Debet") onto the fixed journal schema
//! and coerces cell values. Coercion never fails: unparseable amounts become
//! zero and unparseable dates are kept verbatim.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use super::models::{JournalField, JournalLine, RawCell, RawTable, TransactionDate};

lazy_static! {
    static ref HEADER_PUNCTUATION: Regex = Regex::new(r"[._:\-/]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LONG_DATE: Regex = Regex::new(r"^(\d{1,2})\s+([A-Za-z]+)\s+(\d{4})$").unwrap();
}

const MONTHS: [&str; 12] = [
    "januari",
    "februari",
    "maret",
    "april",
    "mei",
    "juni",
    "juli",
    "agustus",
    "september",
    "oktober",
    "november",
    "desember",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Largest serial number Excel accepts as a date (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Lowercase, strip punctuation and collapse whitespace so that
/// `" No. Voucher "`, `"NO_VOUCHER"` and `"no voucher"` compare equal.
pub fn canonicalize_header(header: &str) -> String {
    let without_bom = header.trim_start_matches('\u{feff}');
    let spaced = HEADER_PUNCTUATION.replace_all(without_bom, " ");
    WHITESPACE
        .replace_all(spaced.trim(), " ")
        .to_lowercase()
}

/// Resolve a raw header name to a journal field, if it is a known alias.
pub fn resolve_field(header: &str) -> Option<JournalField> {
    let field = match canonicalize_header(header).as_str() {
        "tanggal" | "tgl" | "date" | "tanggal transaksi" | "transaction date" => {
            JournalField::Date
        }
        "no voucher" | "nomor voucher" | "voucher" | "voucher id" | "voucher no"
        | "no bukti" | "nomor bukti" | "no jurnal" => JournalField::VoucherId,
        "kode akun" | "kode perkiraan" | "no akun" | "account code" | "kode" => {
            JournalField::AccountCode
        }
        "nama akun" | "nama perkiraan" | "akun" | "account name" | "account" => {
            JournalField::AccountName
        }
        "deskripsi" | "keterangan" | "uraian" | "description" | "memo" => {
            JournalField::Description
        }
        "debit" | "debet" => JournalField::Debit,
        "kredit" | "credit" => JournalField::Credit,
        _ => return None,
    };
    Some(field)
}

/// Column index for each journal field found in a header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    indices: HashMap<JournalField, usize>,
}

impl ColumnMapping {
    /// Build the mapping; when several headers resolve to the same field the
    /// leftmost one wins.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut indices = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            match resolve_field(header) {
                Some(field) => {
                    if indices.contains_key(&field) {
                        debug!("Ignoring duplicate column '{}' for {:?}", header, field);
                    } else {
                        indices.insert(field, index);
                    }
                }
                None => debug!("Ignoring unrecognized column '{}'", header),
            }
        }
        Self { indices }
    }

    pub fn index_of(&self, field: JournalField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn missing_fields(&self) -> Vec<JournalField> {
        JournalField::ALL
            .iter()
            .copied()
            .filter(|field| !self.indices.contains_key(field))
            .collect()
    }

    fn cell<'a>(&self, row: &'a [RawCell], field: JournalField) -> &'a RawCell {
        self.index_of(field)
            .and_then(|index| row.get(index))
            .unwrap_or(&RawCell::Empty)
    }
}

/// Normalize a raw table into typed journal lines.
///
/// Rows whose mapped cells are all blank are dropped; missing columns
/// default to empty text or zero.
pub fn normalize(table: &RawTable) -> Vec<JournalLine> {
    let mapping = ColumnMapping::from_headers(&table.headers);
    let missing = mapping.missing_fields();
    if !missing.is_empty() {
        debug!("Columns not present in upload, using defaults: {:?}", missing);
    }

    let lines: Vec<JournalLine> = table
        .rows
        .iter()
        .filter(|row| {
            JournalField::ALL
                .iter()
                .any(|field| !mapping.cell(row, *field).is_blank())
        })
        .map(|row| JournalLine {
            date: coerce_date(mapping.cell(row, JournalField::Date)),
            voucher_id: coerce_text(mapping.cell(row, JournalField::VoucherId)),
            account_code: coerce_text(mapping.cell(row, JournalField::AccountCode)),
            account_name: coerce_text(mapping.cell(row, JournalField::AccountName)),
            description: coerce_text(mapping.cell(row, JournalField::Description)),
            debit: coerce_amount(mapping.cell(row, JournalField::Debit)),
            credit: coerce_amount(mapping.cell(row, JournalField::Credit)),
        })
        .collect();

    info!(
        "Normalized {} journal lines from {} rows",
        lines.len(),
        table.rows.len()
    );
    lines
}

/// Distinct voucher ids in order of first appearance, blank ids skipped.
pub fn voucher_ids(lines: &[JournalLine]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for line in lines {
        if !line.voucher_id.is_empty() && !ids.contains(&line.voucher_id) {
            ids.push(line.voucher_id.clone());
        }
    }
    ids
}

/// Text form of a cell. Whole numbers lose their `.0` so numeric voucher
/// ids and account codes print as typed.
pub fn coerce_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(text) => text.trim().to_string(),
        RawCell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        RawCell::Number(value) => value.to_string(),
        RawCell::Date(date) => date.format("%Y-%m-%d").to_string(),
    }
}

/// Amount coercion: fractional values are truncated, anything unparseable or
/// negative becomes zero.
pub fn coerce_amount(cell: &RawCell) -> u64 {
    match cell {
        RawCell::Number(value) => truncate_amount(*value),
        RawCell::Text(text) => parse_amount_text(text),
        RawCell::Empty | RawCell::Date(_) => 0,
    }
}

/// Parse an amount typed as text.
///
/// `.` is read as a thousands separator and `,` as the decimal mark
/// (`1.500.000,50`), unless the text is unambiguously written the other way
/// round (`1,500,000.50` or `1500.25`).
pub fn parse_amount_text(text: &str) -> u64 {
    let mut cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.to_lowercase().starts_with("rp") {
        cleaned = cleaned[2..].to_string();
    }
    if let Some(stripped) = cleaned.strip_suffix(",-") {
        cleaned = stripped.to_string();
    }
    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        return 0;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if dot > comma => cleaned.replace(',', ""),
        (Some(_), Some(_)) => cleaned.replace('.', "").replace(',', "."),
        (None, Some(_)) => {
            if cleaned.matches(',').count() > 1 {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (Some(dot), None) => {
            let decimals = cleaned.len() - dot - 1;
            if cleaned.matches('.').count() > 1 || decimals == 3 {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    normalized
        .parse::<f64>()
        .map(truncate_amount)
        .unwrap_or(0)
}

fn truncate_amount(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.trunc() as u64
}

/// Date coercion. Spreadsheet dates and Excel serial numbers are accepted as
/// dates; text that matches no known format is kept verbatim.
pub fn coerce_date(cell: &RawCell) -> TransactionDate {
    match cell {
        RawCell::Empty => TransactionDate::Missing,
        RawCell::Date(date) => TransactionDate::Parsed(*date),
        RawCell::Number(serial) => match excel_serial_to_date(*serial) {
            Some(date) => TransactionDate::Parsed(date),
            None => TransactionDate::Raw(coerce_text(cell)),
        },
        RawCell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return TransactionDate::Missing;
            }
            match parse_date_text(trimmed) {
                Some(date) => TransactionDate::Parsed(date),
                None => TransactionDate::Raw(trimmed.to_string()),
            }
        }
    }
}

/// Parse the textual date formats seen in exported ledgers.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    parse_indonesian_long_date(text)
}

/// `5 Januari 2024` / `05 agustus 2023`.
fn parse_indonesian_long_date(text: &str) -> Option<NaiveDate> {
    let captures = LONG_DATE.captures(text)?;
    let day: u32 = captures[1].parse().ok()?;
    let month_name = captures[2].to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let year: i32 = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert an Excel 1900-system serial number to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_header_variants() {
        assert_eq!(canonicalize_header("  No. Voucher "), "no voucher");
        assert_eq!(canonicalize_header("NO_VOUCHER"), "no voucher");
        assert_eq!(canonicalize_header("\u{feff}Tanggal"), "tanggal");
        assert_eq!(canonicalize_header("Kode   Akun"), "kode akun");
    }

    #[test]
    fn test_resolve_field_aliases() {
        assert_eq!(resolve_field("Debet"), Some(JournalField::Debit));
        assert_eq!(resolve_field("DEBIT"), Some(JournalField::Debit));
        assert_eq!(resolve_field("Credit"), Some(JournalField::Credit));
        assert_eq!(resolve_field("Keterangan"), Some(JournalField::Description));
        assert_eq!(resolve_field("No Bukti"), Some(JournalField::VoucherId));
        assert_eq!(resolve_field("Saldo"), None);
    }

    #[test]
    fn test_parse_amount_text_locales() {
        assert_eq!(parse_amount_text("500.000"), 500_000);
        assert_eq!(parse_amount_text("1.500.000,75"), 1_500_000);
        assert_eq!(parse_amount_text("Rp 2.000.000,-"), 2_000_000);
        assert_eq!(parse_amount_text("1,500,000.50"), 1_500_000);
        assert_eq!(parse_amount_text("1500.25"), 1500);
        assert_eq!(parse_amount_text("12,5"), 12);
    }

    #[test]
    fn test_parse_amount_text_invalid_is_zero() {
        assert_eq!(parse_amount_text(""), 0);
        assert_eq!(parse_amount_text("abc"), 0);
        assert_eq!(parse_amount_text("-500"), 0);
        assert_eq!(parse_amount_text("(500)"), 0);
    }

    #[test]
    fn test_coerce_amount_truncates_numbers() {
        assert_eq!(coerce_amount(&RawCell::Number(1234.99)), 1234);
        assert_eq!(coerce_amount(&RawCell::Number(f64::NAN)), 0);
        assert_eq!(coerce_amount(&RawCell::Empty), 0);
    }

    #[test]
    fn test_coerce_date_keeps_raw_text() {
        assert_eq!(
            coerce_date(&RawCell::text("2024-01-05")),
            TransactionDate::Parsed(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
        assert_eq!(
            coerce_date(&RawCell::text("5 Januari 2024")),
            TransactionDate::Parsed(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
        assert_eq!(
            coerce_date(&RawCell::text("akhir bulan")),
            TransactionDate::Raw("akhir bulan".to_string())
        );
        assert_eq!(coerce_date(&RawCell::Empty), TransactionDate::Missing);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45296.0),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn test_coerce_text_whole_numbers() {
        assert_eq!(coerce_text(&RawCell::Number(101.0)), "101");
        assert_eq!(coerce_text(&RawCell::Number(1.5)), "1.5");
        assert_eq!(coerce_text(&RawCell::text("  Kas  ")), "Kas");
    }
}
