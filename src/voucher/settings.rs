//! Presentation settings and the declarative column specification shared by
//! the PDF and HTML renderers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Columns a voucher table can show.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Date,
    AccountCode,
    AccountName,
    Description,
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_css(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

/// One table column: header label, width in millimetres, alignment and
/// whether long text wraps onto several lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub header: String,
    pub width: f32,
    pub align: Align,
    pub wrap: bool,
}

impl ColumnSpec {
    pub fn new(key: ColumnKey, header: &str, width: f32, align: Align, wrap: bool) -> Self {
        Self {
            key,
            header: header.to_string(),
            width,
            align,
            wrap,
        }
    }

    /// Amount columns never wrap and take part in the totals row.
    pub fn is_amount(&self) -> bool {
        matches!(self.key, ColumnKey::Debit | ColumnKey::Credit)
    }

    /// Default A4 layout, 190 mm wide.
    pub fn defaults() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new(ColumnKey::Date, "Tanggal", 22.0, Align::Left, true),
            ColumnSpec::new(ColumnKey::AccountCode, "Kode Akun", 22.0, Align::Left, true),
            ColumnSpec::new(ColumnKey::AccountName, "Nama Akun", 42.0, Align::Left, true),
            ColumnSpec::new(ColumnKey::Description, "Deskripsi", 54.0, Align::Left, true),
            ColumnSpec::new(ColumnKey::Debit, "Debit", 25.0, Align::Right, false),
            ColumnSpec::new(ColumnKey::Credit, "Kredit", 25.0, Align::Right, false),
        ]
    }
}

/// Where the line descriptions are printed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionPlacement {
    /// A dedicated, wrapping table column.
    #[default]
    Column,
    /// No column; the first line's description is printed once below the totals.
    Trailing,
}

pub const DEFAULT_LOGO_WIDTH_MM: f32 = 25.0;

/// Immutable presentation settings for one render request.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherSettings {
    pub company_name: String,
    pub company_address: String,
    pub approver_name: String,
    pub preparer_name: String,
    pub logo: Option<Vec<u8>>,
    pub logo_width_mm: f32,
    pub column_widths: HashMap<ColumnKey, f32>,
    pub description_placement: DescriptionPlacement,
}

impl Default for VoucherSettings {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            company_address: String::new(),
            approver_name: String::new(),
            preparer_name: String::new(),
            logo: None,
            logo_width_mm: DEFAULT_LOGO_WIDTH_MM,
            column_widths: HashMap::new(),
            description_placement: DescriptionPlacement::default(),
        }
    }
}

impl VoucherSettings {
    /// Column list after applying description placement and width overrides.
    /// Non-positive or non-finite overrides are ignored.
    pub fn columns(&self) -> Vec<ColumnSpec> {
        let mut columns = ColumnSpec::defaults();

        if self.description_placement == DescriptionPlacement::Trailing {
            let freed: f32 = columns
                .iter()
                .filter(|c| c.key == ColumnKey::Description)
                .map(|c| c.width)
                .sum();
            columns.retain(|c| c.key != ColumnKey::Description);
            if let Some(name) = columns.iter_mut().find(|c| c.key == ColumnKey::AccountName) {
                name.width += freed;
            }
        }

        for column in columns.iter_mut() {
            if let Some(width) = self.column_widths.get(&column.key) {
                if width.is_finite() && *width > 0.0 {
                    column.width = *width;
                }
            }
        }
        columns
    }

    pub fn logo_width(&self) -> f32 {
        if self.logo_width_mm.is_finite() && self.logo_width_mm > 0.0 {
            self.logo_width_mm
        } else {
            DEFAULT_LOGO_WIDTH_MM
        }
    }
}

/// Per-request overrides, as sent in the `settings` multipart field.
/// Absent fields keep the server defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct VoucherSettingsInput {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub approver_name: Option<String>,
    pub preparer_name: Option<String>,
    pub logo_width_mm: Option<f32>,
    #[serde(default)]
    pub column_widths: HashMap<ColumnKey, f32>,
    pub description_placement: Option<DescriptionPlacement>,
}

impl VoucherSettingsInput {
    pub fn apply(self, base: &VoucherSettings) -> VoucherSettings {
        let mut settings = base.clone();
        if let Some(value) = self.company_name {
            settings.company_name = value;
        }
        if let Some(value) = self.company_address {
            settings.company_address = value;
        }
        if let Some(value) = self.approver_name {
            settings.approver_name = value;
        }
        if let Some(value) = self.preparer_name {
            settings.preparer_name = value;
        }
        if let Some(value) = self.logo_width_mm {
            settings.logo_width_mm = value;
        }
        if let Some(value) = self.description_placement {
            settings.description_placement = value;
        }
        settings.column_widths.extend(self.column_widths);
        settings
    }
}
