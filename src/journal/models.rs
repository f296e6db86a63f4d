use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell as decoded from a spreadsheet or CSV file, before any
/// column mapping or coercion takes place.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(value)
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) | RawCell::Date(_) => false,
        }
    }
}

/// Header row plus data rows, exactly as read from the upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { headers, rows }
    }
}

/// Transaction date of a journal line.
///
/// Dates that cannot be parsed are kept as the original text so the printed
/// voucher still shows what the bookkeeper typed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TransactionDate {
    Parsed(NaiveDate),
    Raw(String),
    #[default]
    Missing,
}

impl TransactionDate {
    /// Display form used on printed vouchers (`05/01/2024`).
    pub fn display(&self) -> String {
        match self {
            TransactionDate::Parsed(date) => date.format("%d/%m/%Y").to_string(),
            TransactionDate::Raw(text) => text.clone(),
            TransactionDate::Missing => String::new(),
        }
    }
}

/// One normalized ledger row.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalLine {
    pub date: TransactionDate,
    pub voucher_id: String,
    pub account_code: String,
    pub account_name: String,
    pub description: String,
    pub debit: u64,
    pub credit: u64,
}

impl JournalLine {
    pub fn new(
        voucher_id: impl Into<String>,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        description: impl Into<String>,
        debit: u64,
        credit: u64,
    ) -> Self {
        Self {
            date: TransactionDate::Missing,
            voucher_id: voucher_id.into(),
            account_code: account_code.into(),
            account_name: account_name.into(),
            description: description.into(),
            debit,
            credit,
        }
    }

    pub fn with_date(mut self, date: TransactionDate) -> Self {
        self.date = date;
        self
    }
}

/// Fields of the fixed journal schema that input headers are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JournalField {
    Date,
    VoucherId,
    AccountCode,
    AccountName,
    Description,
    Debit,
    Credit,
}

impl JournalField {
    pub const ALL: [JournalField; 7] = [
        JournalField::Date,
        JournalField::VoucherId,
        JournalField::AccountCode,
        JournalField::AccountName,
        JournalField::Description,
        JournalField::Debit,
        JournalField::Credit,
    ];

    /// Canonical (Indonesian) header name.
    pub fn canonical_header(&self) -> &'static str {
        match self {
            JournalField::Date => "Tanggal",
            JournalField::VoucherId => "No Voucher",
            JournalField::AccountCode => "Kode Akun",
            JournalField::AccountName => "Nama Akun",
            JournalField::Description => "Deskripsi",
            JournalField::Debit => "Debit",
            JournalField::Credit => "Kredit",
        }
    }
}
