//! Table layout for vouchers.
//!
//! A row is as tall as the largest number of wrapped lines needed by any
//! wrap-eligible column in that row, times [`LINE_HEIGHT`]. The height is
//! computed once per row so every cell in the row is drawn as a rectangle of
//! the same height.

use super::common::format_amount;
use super::settings::{Align, ColumnSpec, ColumnKey};
use super::{Voucher, VoucherTotals};
use crate::journal::JournalLine;

/// Height of one text line in a table cell (mm).
pub const LINE_HEIGHT: f32 = 6.0;
/// Horizontal padding on each side of a cell (mm).
pub const CELL_MARGIN: f32 = 1.0;
/// Font size of table text (pt).
pub const TABLE_FONT_SIZE: f32 = 9.0;

/// Points to millimetres.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Text measurement used for line wrapping.
pub trait TextMeasure {
    /// Width of `text` in millimetres at `font_size` points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Glyph widths of the PDF standard Helvetica faces, characters 32..=126,
/// in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // {..~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, // a..z
    389, 280, 389, 584, // {..~
];

/// Metrics for the builtin Helvetica fonts the PDF renderer draws with.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica {
    pub bold: bool,
}

impl Helvetica {
    pub const REGULAR: Helvetica = Helvetica { bold: false };
    pub const BOLD: Helvetica = Helvetica { bold: true };

    fn glyph_width(&self, ch: char) -> u16 {
        let table = if self.bold {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        match ch as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => 556,
        }
    }
}

impl TextMeasure for Helvetica {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| self.glyph_width(ch) as u32).sum();
        units as f32 / 1000.0 * font_size * PT_TO_MM
    }
}

/// Greedily pack whitespace-delimited words into lines no wider than
/// `width - 2 * CELL_MARGIN`. Words that do not fit on a line of their own
/// are broken by character. Explicit newlines always break. Empty text still
/// yields one (empty) line.
///
/// Widths are accumulated word by word, so wrapping stays linear in the
/// length of the text whatever the column width.
pub fn wrap_text(text: &str, width: f32, measure: &dyn TextMeasure, font_size: f32) -> Vec<String> {
    let available = (width - 2.0 * CELL_MARGIN).max(0.0);
    let space = measure.text_width(" ", font_size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0;
        for word in paragraph.split_whitespace() {
            let word_width = measure.text_width(word, font_size);
            if !current.is_empty() && current_width + space + word_width <= available {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if word_width <= available {
                current.push_str(word);
                current_width = word_width;
            } else {
                let mut pieces = break_word(word, available, measure, font_size);
                let (last, last_width) = pieces.pop().unwrap_or_default();
                current = last;
                current_width = last_width;
                lines.extend(pieces.into_iter().map(|(piece, _)| piece));
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split a word into pieces that fit `available`, each with its width.
fn break_word(
    word: &str,
    available: f32,
    measure: &dyn TextMeasure,
    font_size: f32,
) -> Vec<(String, f32)> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    let mut glyph = [0u8; 4];
    for ch in word.chars() {
        let ch_width = measure.text_width(ch.encode_utf8(&mut glyph), font_size);
        // A single glyph wider than the cell still gets its own line.
        if !current.is_empty() && current_width + ch_width > available {
            pieces.push((std::mem::take(&mut current), current_width));
            current_width = 0.0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    pieces.push((current, current_width));
    pieces
}

/// Number of lines `text` occupies in a cell of `width` mm.
pub fn wrapped_line_count(text: &str, width: f32, measure: &dyn TextMeasure, font_size: f32) -> usize {
    wrap_text(text, width, measure, font_size).len()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub width: f32,
    pub align: Align,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub cells: Vec<CellLayout>,
    pub line_count: usize,
    pub height: f32,
}

/// Lay out one row. Wrap-eligible cells are wrapped, others keep a single
/// line; the row height is shared by every cell.
pub fn layout_row(
    values: &[String],
    columns: &[ColumnSpec],
    measure: &dyn TextMeasure,
    font_size: f32,
) -> RowLayout {
    let cells: Vec<CellLayout> = columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            let lines = if column.wrap {
                wrap_text(value, column.width, measure, font_size)
            } else {
                vec![value.replace('\n', " ")]
            };
            CellLayout {
                width: column.width,
                align: column.align,
                lines,
            }
        })
        .collect();

    let line_count = cells
        .iter()
        .map(|cell| cell.lines.len())
        .max()
        .unwrap_or(1)
        .max(1);

    RowLayout {
        cells,
        line_count,
        height: line_count as f32 * LINE_HEIGHT,
    }
}

/// Text shown for `line` in column `key`.
pub fn cell_value(line: &JournalLine, key: ColumnKey) -> String {
    match key {
        ColumnKey::Date => line.date.display(),
        ColumnKey::AccountCode => line.account_code.clone(),
        ColumnKey::AccountName => line.account_name.clone(),
        ColumnKey::Description => line.description.clone(),
        ColumnKey::Debit => format_amount(line.debit),
        ColumnKey::Credit => format_amount(line.credit),
    }
}

/// Complete table: header row, one row per journal line, and totals.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub columns: Vec<ColumnSpec>,
    pub header: RowLayout,
    pub rows: Vec<RowLayout>,
    pub totals: VoucherTotals,
}

impl TableLayout {
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Width spanned by the "Total" label: every non-amount column.
    pub fn label_width(&self) -> f32 {
        self.columns
            .iter()
            .filter(|c| !c.is_amount())
            .map(|c| c.width)
            .sum()
    }

    pub fn amount_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.is_amount())
    }
}

pub fn layout_table(voucher: &Voucher<'_>, columns: &[ColumnSpec]) -> TableLayout {
    let header_values: Vec<String> = columns.iter().map(|c| c.header.clone()).collect();
    let header_columns: Vec<ColumnSpec> = columns
        .iter()
        .map(|c| ColumnSpec {
            align: Align::Center,
            wrap: true,
            ..c.clone()
        })
        .collect();
    let header = layout_row(&header_values, &header_columns, &Helvetica::BOLD, TABLE_FONT_SIZE);

    let rows = voucher
        .lines
        .iter()
        .map(|line| {
            let values: Vec<String> = columns.iter().map(|c| cell_value(line, c.key)).collect();
            layout_row(&values, columns, &Helvetica::REGULAR, TABLE_FONT_SIZE)
        })
        .collect();

    TableLayout {
        columns: columns.to_vec(),
        header,
        rows,
        totals: voucher.totals,
    }
}
