//! HTML preview renderer.
//!
//! Produces a self-contained fragment from the same table layout as the PDF
//! renderer, so wrapped cells break at the same words in both outputs.

use std::fmt::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::common::{
    decode_logo, detect_image_mime, escape_html, format_amount, format_indonesian_date,
    signature_label,
};
use super::layout::{layout_table, CellLayout, TableLayout};
use super::pdf::TITLE;
use super::settings::{ColumnKey, DescriptionPlacement, VoucherSettings};
use super::traits::VoucherRenderer;
use super::{DegradedReason, RenderStatus, RenderedDocument, Voucher, VoucherError};

const STYLE: &str = "<style>\
.voucher{font-family:Helvetica,Arial,sans-serif;font-size:9pt;width:190mm}\
.voucher header{text-align:center;position:relative;min-height:20mm}\
.voucher header img{position:absolute;left:0;top:0}\
.voucher h1{font-size:14pt;margin:0}\
.voucher h2{font-size:12pt;margin:3mm 0 1mm}\
.voucher .meta{display:flex;justify-content:space-between}\
.voucher table{border-collapse:collapse;table-layout:fixed}\
.voucher td,.voucher th{border:0.5pt solid #000;padding:0 1mm;vertical-align:top}\
.voucher .block{border:0.5pt solid #000;padding:1mm;margin-top:3mm}\
.voucher .signatures{display:flex;justify-content:space-between;margin-top:8mm}\
.voucher .signature{width:60mm;text-align:center}\
.voucher .signature .space{height:20mm}\
</style>";

/// Renders vouchers as an HTML fragment for on-screen preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlVoucherRenderer;

impl VoucherRenderer for HtmlVoucherRenderer {
    fn render(
        &self,
        voucher: &Voucher<'_>,
        settings: &VoucherSettings,
    ) -> Result<RenderedDocument, VoucherError> {
        let mut reasons = Vec::new();
        let mut html = String::with_capacity(4096);

        html.push_str(STYLE);
        html.push_str("<div class=\"voucher\">");

        html.push_str("<header>");
        if let Some(bytes) = settings.logo.as_deref() {
            match logo_data_uri(bytes) {
                Ok(uri) => {
                    let _ = write!(
                        html,
                        "<img src=\"{}\" alt=\"logo\" style=\"width:{}mm\">",
                        uri,
                        settings.logo_width()
                    );
                }
                Err(reason) => reasons.push(DegradedReason::LogoSkipped(reason)),
            }
        }
        if !settings.company_name.trim().is_empty() {
            let _ = write!(html, "<h1>{}</h1>", escape_html(settings.company_name.trim()));
        }
        for line in settings
            .company_address
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
        {
            let _ = write!(html, "<div class=\"address\">{}</div>", escape_html(line));
        }
        let _ = write!(html, "<h2>{}</h2>", TITLE);
        let _ = write!(
            html,
            "<div class=\"meta\"><span>No. Voucher: {}</span>",
            escape_html(voucher.id)
        );
        if let Some(date) = voucher.first_date() {
            let _ = write!(html, "<span>Tanggal: {}</span>", format_indonesian_date(date));
        }
        html.push_str("</div></header>");

        let table = layout_table(voucher, &settings.columns());
        write_table(&mut html, &table);

        if settings.description_placement == DescriptionPlacement::Trailing {
            if let Some(description) = voucher.first_description() {
                let _ = write!(
                    html,
                    "<div class=\"block description\">Deskripsi: {}</div>",
                    escape_html(description)
                );
            }
        }
        let _ = write!(
            html,
            "<div class=\"block terbilang\">Terbilang: {}</div>",
            escape_html(&voucher.amount_in_words())
        );

        html.push_str("<div class=\"signatures\">");
        for (caption, name) in [
            ("Disetujui oleh,", &settings.approver_name),
            ("Dibuat oleh,", &settings.preparer_name),
        ] {
            let _ = write!(
                html,
                "<div class=\"signature\"><div>{}</div><div class=\"space\"></div><div>{}</div></div>",
                caption,
                escape_html(&signature_label(name)).replace(' ', "&nbsp;")
            );
        }
        html.push_str("</div></div>");

        Ok(RenderedDocument {
            bytes: html.into_bytes(),
            content_type: "text/html; charset=utf-8",
            extension: "html",
            status: RenderStatus::from_reasons(reasons),
        })
    }
}

/// Data URI for any logo the decoder accepts, so the preview and the PDF
/// agree on which logos are usable.
fn logo_data_uri(bytes: &[u8]) -> Result<String, String> {
    decode_logo(bytes)?;
    let mime = detect_image_mime(bytes).ok_or_else(|| "unsupported logo format".to_string())?;
    Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}

fn write_table(html: &mut String, table: &TableLayout) {
    html.push_str("<table><colgroup>");
    for column in &table.columns {
        let _ = write!(html, "<col style=\"width:{}mm\">", column.width);
    }
    html.push_str("</colgroup><thead><tr>");
    for cell in &table.header.cells {
        let _ = write!(html, "<th>{}</th>", cell_html(cell));
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        html.push_str("<tr>");
        for cell in &row.cells {
            let _ = write!(
                html,
                "<td style=\"text-align:{}\">{}</td>",
                cell.align.as_css(),
                cell_html(cell)
            );
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody><tfoot><tr>");

    let label_span = table.columns.iter().filter(|c| !c.is_amount()).count();
    let _ = write!(
        html,
        "<th colspan=\"{}\" style=\"text-align:right\">Total</th>",
        label_span
    );
    for column in table.amount_columns() {
        let amount = match column.key {
            ColumnKey::Debit => table.totals.debit,
            _ => table.totals.credit,
        };
        let _ = write!(
            html,
            "<th style=\"text-align:right\">{}</th>",
            format_amount(amount)
        );
    }
    html.push_str("</tr></tfoot></table>");
}

fn cell_html(cell: &CellLayout) -> String {
    cell.lines
        .iter()
        .map(|line| escape_html(line))
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalLine;

    fn render(lines: &[JournalLine], settings: &VoucherSettings) -> (String, RenderStatus) {
        let voucher = Voucher::select(lines, "V1").unwrap();
        let document = HtmlVoucherRenderer.render(&voucher, settings).unwrap();
        (String::from_utf8(document.bytes).unwrap(), document.status)
    }

    #[test]
    fn test_preview_contains_table_totals_and_words() {
        let lines = vec![
            JournalLine::new("V1", "101", "Kas", "Setoran modal", 500_000, 0),
            JournalLine::new("V1", "301", "Modal", "Setoran modal", 0, 500_000),
        ];
        let settings = VoucherSettings {
            company_name: "PT Maju".to_string(),
            approver_name: "Budi".to_string(),
            ..Default::default()
        };
        let (html, status) = render(&lines, &settings);
        assert_eq!(status, RenderStatus::Complete);
        assert!(html.contains("<h1>PT Maju</h1>"));
        assert!(html.contains("BUKTI JURNAL UMUM"));
        assert!(html.contains("No. Voucher: V1"));
        assert!(html.contains("<th style=\"text-align:right\">500.000</th>"));
        assert!(html.contains("Terbilang: Lima Ratus Ribu Rupiah"));
        assert!(html.contains("(&nbsp;Budi&nbsp;)"));
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let lines = vec![JournalLine::new("V1", "101", "<script>", "a & b", 1, 0)];
        let (html, _) = render(&lines, &VoucherSettings::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_undecodable_logo_is_omitted() {
        let lines = vec![JournalLine::new("V1", "101", "Kas", "", 1, 0)];
        let settings = VoucherSettings {
            logo: Some(vec![0x89, 0x50, 0x4E, 0x47, 0x00]),
            ..Default::default()
        };
        let (html, status) = render(&lines, &settings);
        assert!(!html.contains("<img"));
        assert!(status.is_degraded());
    }

    #[test]
    fn test_tiff_logo_is_embedded() {
        use printpdf::image_crate::{DynamicImage, ImageOutputFormat, RgbImage};
        use std::io::Cursor;

        let mut tiff = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
            .write_to(&mut tiff, ImageOutputFormat::Tiff)
            .unwrap();
        let lines = vec![JournalLine::new("V1", "101", "Kas", "", 1, 0)];
        let settings = VoucherSettings {
            logo: Some(tiff.into_inner()),
            ..Default::default()
        };
        let (html, status) = render(&lines, &settings);
        assert!(html.contains("<img"));
        assert!(html.contains("data:image/tiff;base64,"));
        assert_eq!(status, RenderStatus::Complete);
    }

    #[test]
    fn test_trailing_description_block() {
        let lines = vec![JournalLine::new("V1", "101", "Kas", "Biaya listrik", 1, 0)];
        let settings = VoucherSettings {
            description_placement: DescriptionPlacement::Trailing,
            ..Default::default()
        };
        let (html, _) = render(&lines, &settings);
        assert!(html.contains("Deskripsi: Biaya listrik"));
        assert!(!html.contains("<th>Deskripsi</th>"));
    }
}
