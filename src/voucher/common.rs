//! Common utilities for voucher rendering.
//!
//! Shared helpers for amount/date formatting, filenames, HTML escaping and
//! logo decoding.

use chrono::{Datelike, NaiveDate};
use printpdf::image_crate::{self, DynamicImage};

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format an amount with `.` as thousands separator (e.g. "1.500.000").
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Format a date in Indonesian long form (e.g. "5 Januari 2024").
pub fn format_indonesian_date(date: NaiveDate) -> String {
    let month = MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Name line under a signature space: `( name )`, or blank parentheses
/// wide enough to sign in when no name is configured.
pub fn signature_label(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("({})", " ".repeat(30))
    } else {
        format!("( {} )", name)
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '_' | '/' | '.'))
            && !last_dash
            && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.to_string()
}

/// MIME type of an image the decoder recognizes, from its magic bytes.
pub fn detect_image_mime(data: &[u8]) -> Option<&'static str> {
    image_crate::guess_format(data)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Decode logo bytes into an image, returning a short reason on failure.
pub fn decode_logo(data: &[u8]) -> Result<DynamicImage, String> {
    if data.is_empty() {
        return Err("logo file is empty".to_string());
    }
    image_crate::load_from_memory(data).map_err(|e| format!("logo could not be decoded: {}", e))
}
