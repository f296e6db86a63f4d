//! PDF voucher renderer.
//!
//! Draws the shared table layout onto A4 pages with `printpdf` builtin
//! Helvetica fonts. Positions are tracked from the top of the page and
//! flipped to PDF coordinates only when drawing.

use std::io::BufWriter;

use log::debug;
use printpdf::image_crate::DynamicImage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};

use super::common::{decode_logo, format_amount, format_indonesian_date, signature_label};
use super::layout::{
    layout_table, wrap_text, Helvetica, RowLayout, TableLayout, TextMeasure, CELL_MARGIN,
    LINE_HEIGHT, PT_TO_MM, TABLE_FONT_SIZE,
};
use super::settings::{Align, ColumnKey, DescriptionPlacement, VoucherSettings};
use super::traits::VoucherRenderer;
use super::{DegradedReason, RenderStatus, RenderedDocument, Voucher, VoucherError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const TOTALS_HEIGHT: f32 = 8.0;
const LOGO_DPI: f32 = 300.0;
const SIGNATURE_WIDTH: f32 = 60.0;
const SIGNATURE_SPACE: f32 = 20.0;
const OUTLINE_THICKNESS: f32 = 0.5;

pub const TITLE: &str = "BUKTI JURNAL UMUM";

/// Stateless renderer producing one A4 PDF per voucher.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfVoucherRenderer;

impl VoucherRenderer for PdfVoucherRenderer {
    fn render(
        &self,
        voucher: &Voucher<'_>,
        settings: &VoucherSettings,
    ) -> Result<RenderedDocument, VoucherError> {
        let (canvas, reasons) = draw_voucher(voucher, settings)?;
        debug!("Voucher '{}' laid out on {} page(s)", voucher.id, canvas.pages);
        let bytes = canvas.finish()?;

        Ok(RenderedDocument {
            bytes,
            content_type: "application/pdf",
            extension: "pdf",
            status: RenderStatus::from_reasons(reasons),
        })
    }
}

fn draw_voucher(
    voucher: &Voucher<'_>,
    settings: &VoucherSettings,
) -> Result<(Canvas, Vec<DegradedReason>), VoucherError> {
    let mut canvas = Canvas::new(&format!("Bukti Jurnal {}", voucher.id))?;
    let mut reasons = Vec::new();

    let logo_bottom = match settings.logo.as_deref() {
        Some(bytes) => match canvas.logo(bytes, settings.logo_width()) {
            Ok(bottom) => bottom,
            Err(reason) => {
                reasons.push(DegradedReason::LogoSkipped(reason));
                MARGIN
            }
        },
        None => MARGIN,
    };

    draw_header(&mut canvas, voucher, settings, logo_bottom);

    let table = layout_table(voucher, &settings.columns());
    draw_table(&mut canvas, &table);

    if settings.description_placement == DescriptionPlacement::Trailing {
        if let Some(description) = voucher.first_description() {
            draw_block(&mut canvas, &format!("Deskripsi: {}", description), table.width());
        }
    }
    draw_block(
        &mut canvas,
        &format!("Terbilang: {}", voucher.amount_in_words()),
        table.width(),
    );
    draw_signatures(&mut canvas, settings);

    Ok((canvas, reasons))
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance of the drawing cursor from the top edge (mm).
    y: f32,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, VoucherError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        layer.set_outline_thickness(OUTLINE_THICKNESS);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| VoucherError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| VoucherError::Pdf(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: MARGIN,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.layer.set_outline_thickness(OUTLINE_THICKNESS);
        self.y = MARGIN;
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= PAGE_HEIGHT - MARGIN
    }

    /// Place the logo at the top-left margin, scaled to `width` mm. Returns
    /// the bottom edge of the image.
    fn logo(&self, bytes: &[u8], width: f32) -> Result<f32, String> {
        let rgb = decode_logo(bytes)?.to_rgb8();
        let (px_width, px_height) = rgb.dimensions();
        if px_width == 0 || px_height == 0 {
            return Err("logo has no pixels".to_string());
        }

        let native_width = px_width as f32 / LOGO_DPI * 25.4;
        let scale = width / native_width;
        let height = px_height as f32 / LOGO_DPI * 25.4 * scale;

        Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(PAGE_HEIGHT - MARGIN - height)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(LOGO_DPI),
                ..Default::default()
            },
        );
        Ok(MARGIN + height)
    }

    /// Draw `text` vertically centred in the slot `[top, top + height]` and
    /// aligned within `[x, x + width]`.
    #[allow(clippy::too_many_arguments)]
    fn text(
        &self,
        text: &str,
        x: f32,
        width: f32,
        top: f32,
        height: f32,
        align: Align,
        font_size: f32,
        bold: bool,
    ) {
        if text.trim().is_empty() {
            return;
        }
        let (font, measure) = if bold {
            (&self.bold, Helvetica::BOLD)
        } else {
            (&self.regular, Helvetica::REGULAR)
        };
        let text_width = measure.text_width(text, font_size);
        let left = match align {
            Align::Left => x,
            Align::Center => x + (width - text_width) / 2.0,
            Align::Right => x + width - text_width,
        };
        let baseline = top + height / 2.0 + 0.35 * font_size * PT_TO_MM;
        self.layer
            .use_text(text, font_size, Mm(left), Mm(PAGE_HEIGHT - baseline), font);
    }

    fn centered(&self, text: &str, top: f32, height: f32, font_size: f32, bold: bool) {
        self.text(text, 0.0, PAGE_WIDTH, top, height, Align::Center, font_size, bold);
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32) {
        let corners = [
            (x, top),
            (x + width, top),
            (x + width, top + height),
            (x, top + height),
        ];
        let points = corners
            .iter()
            .map(|(px, py)| (Point::new(Mm(*px), Mm(PAGE_HEIGHT - py)), false))
            .collect();
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    /// Draw one table row at the cursor. Every cell is a rectangle of the
    /// shared row height.
    fn row(&mut self, row: &RowLayout, bold: bool) {
        let top = self.y;
        let mut x = MARGIN;
        for cell in &row.cells {
            self.rect(x, top, cell.width, row.height);
            for (index, line) in cell.lines.iter().enumerate() {
                self.text(
                    line,
                    x + CELL_MARGIN,
                    cell.width - 2.0 * CELL_MARGIN,
                    top + index as f32 * LINE_HEIGHT,
                    LINE_HEIGHT,
                    cell.align,
                    TABLE_FONT_SIZE,
                    bold,
                );
            }
            x += cell.width;
        }
        self.y += row.height;
    }

    fn finish(self) -> Result<Vec<u8>, VoucherError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| VoucherError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| VoucherError::Pdf(e.to_string()))
    }
}

fn draw_header(
    canvas: &mut Canvas,
    voucher: &Voucher<'_>,
    settings: &VoucherSettings,
    logo_bottom: f32,
) {
    let mut top = MARGIN;

    let company = settings.company_name.trim();
    if !company.is_empty() {
        canvas.centered(company, top, 7.0, 14.0, true);
        top += 7.0;
    }
    for line in settings
        .company_address
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
    {
        canvas.centered(line, top, 5.0, 9.0, false);
        top += 5.0;
    }

    top = top.max(logo_bottom) + 3.0;
    canvas.centered(TITLE, top, 8.0, 12.0, true);
    top += 8.0;

    canvas.text(
        &format!("No. Voucher: {}", voucher.id),
        MARGIN,
        CONTENT_WIDTH,
        top,
        LINE_HEIGHT,
        Align::Left,
        10.0,
        false,
    );
    if let Some(date) = voucher.first_date() {
        canvas.text(
            &format!("Tanggal: {}", format_indonesian_date(date)),
            MARGIN,
            CONTENT_WIDTH,
            top,
            LINE_HEIGHT,
            Align::Right,
            10.0,
            false,
        );
    }
    canvas.y = top + LINE_HEIGHT + 2.0;
}

fn draw_table(canvas: &mut Canvas, table: &TableLayout) {
    let first_row = table.rows.first().map_or(0.0, |row| row.height);
    if !canvas.fits(table.header.height + first_row) {
        canvas.new_page();
    }
    canvas.row(&table.header, true);

    for row in &table.rows {
        // A row taller than a whole page is drawn anyway and runs past the
        // bottom margin.
        if !canvas.fits(row.height) {
            canvas.new_page();
            canvas.row(&table.header, true);
        }
        canvas.row(row, false);
    }

    if !canvas.fits(TOTALS_HEIGHT) {
        canvas.new_page();
        canvas.row(&table.header, true);
    }
    draw_totals(canvas, table);
}

fn draw_totals(canvas: &mut Canvas, table: &TableLayout) {
    let top = canvas.y;
    let label_width = table.label_width();

    canvas.rect(MARGIN, top, label_width, TOTALS_HEIGHT);
    canvas.text(
        "Total",
        MARGIN + CELL_MARGIN,
        label_width - 2.0 * CELL_MARGIN,
        top,
        TOTALS_HEIGHT,
        Align::Right,
        TABLE_FONT_SIZE,
        true,
    );

    let mut x = MARGIN + label_width;
    for column in table.amount_columns() {
        let amount = match column.key {
            ColumnKey::Debit => table.totals.debit,
            _ => table.totals.credit,
        };
        canvas.rect(x, top, column.width, TOTALS_HEIGHT);
        canvas.text(
            &format_amount(amount),
            x + CELL_MARGIN,
            column.width - 2.0 * CELL_MARGIN,
            top,
            TOTALS_HEIGHT,
            Align::Right,
            TABLE_FONT_SIZE,
            true,
        );
        x += column.width;
    }
    canvas.y += TOTALS_HEIGHT;
}

/// Bordered, wrapped paragraph spanning the table width.
fn draw_block(canvas: &mut Canvas, text: &str, width: f32) {
    let lines = wrap_text(text, width, &Helvetica::REGULAR, TABLE_FONT_SIZE);
    let height = lines.len() as f32 * LINE_HEIGHT;

    canvas.y += 3.0;
    if !canvas.fits(height) {
        canvas.new_page();
    }

    let top = canvas.y;
    canvas.rect(MARGIN, top, width, height);
    for (index, line) in lines.iter().enumerate() {
        canvas.text(
            line,
            MARGIN + CELL_MARGIN,
            width - 2.0 * CELL_MARGIN,
            top + index as f32 * LINE_HEIGHT,
            LINE_HEIGHT,
            Align::Left,
            TABLE_FONT_SIZE,
            false,
        );
    }
    canvas.y += height;
}

fn draw_signatures(canvas: &mut Canvas, settings: &VoucherSettings) {
    let height = LINE_HEIGHT * 2.0 + SIGNATURE_SPACE;
    canvas.y += 8.0;
    if !canvas.fits(height) {
        canvas.new_page();
    }

    let top = canvas.y;
    let blocks = [
        (MARGIN, "Disetujui oleh,", settings.approver_name.as_str()),
        (
            PAGE_WIDTH - MARGIN - SIGNATURE_WIDTH,
            "Dibuat oleh,",
            settings.preparer_name.as_str(),
        ),
    ];
    for (x, caption, name) in blocks {
        canvas.text(
            caption,
            x,
            SIGNATURE_WIDTH,
            top,
            LINE_HEIGHT,
            Align::Center,
            10.0,
            false,
        );
        canvas.text(
            &signature_label(name),
            x,
            SIGNATURE_WIDTH,
            top + LINE_HEIGHT + SIGNATURE_SPACE,
            LINE_HEIGHT,
            Align::Center,
            10.0,
            false,
        );
    }
    canvas.y += height;
}
