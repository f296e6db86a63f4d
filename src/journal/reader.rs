//! Spreadsheet and delimited-text decoding.
//!
//! Produces a [`RawTable`] from uploaded bytes. Workbooks (xlsx, xlsm, xls,
//! xlsb, ods) are read with `calamine`, delimited text with `csv`.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::{debug, info};
use thiserror::Error;

use super::models::{RawCell, RawTable};
use super::normalizer::excel_serial_to_date;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("no header row found")]
    NoHeader,
    #[error("workbook contains no worksheet")]
    NoSheet,
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to read delimited text: {0}")]
    Csv(#[from] csv::Error),
}

/// Input formats understood by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Workbook,
}

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

impl SourceFormat {
    /// Pick a format from the file extension, falling back to magic bytes.
    pub fn detect(data: &[u8], filename: &str) -> Self {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("txt") | Some("tsv") => SourceFormat::Delimited,
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
                SourceFormat::Workbook
            }
            _ if data.starts_with(&ZIP_MAGIC) || data.starts_with(&OLE_MAGIC) => {
                SourceFormat::Workbook
            }
            _ => SourceFormat::Delimited,
        }
    }
}

/// Decode an uploaded file into headers and rows.
pub fn read_table(data: &[u8], filename: &str) -> Result<RawTable, ReadError> {
    if data.is_empty() {
        return Err(ReadError::Empty);
    }

    let format = SourceFormat::detect(data, filename);
    debug!("Reading '{}' as {:?} ({} bytes)", filename, format, data.len());

    let table = match format {
        SourceFormat::Delimited => read_delimited(data)?,
        SourceFormat::Workbook => read_workbook(data)?,
    };

    info!(
        "Read {} data rows with headers {:?} from '{}'",
        table.rows.len(),
        table.headers,
        filename
    );
    Ok(table)
}

/// Read the first worksheet of a workbook.
pub fn read_workbook(data: &[u8]) -> Result<RawTable, ReadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;
    let range = workbook.worksheet_range_at(0).ok_or(ReadError::NoSheet)??;

    let rows: Vec<Vec<RawCell>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    split_header(rows)
}

fn cell_from_data(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::text(s.as_str()),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Float(v) => RawCell::Number(*v),
        Data::Bool(v) => RawCell::text(v.to_string()),
        Data::DateTime(v) => match excel_serial_to_date(v.as_f64()) {
            Some(date) => RawCell::Date(date),
            None => RawCell::Number(v.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::text(s.as_str()),
        Data::Error(_) => RawCell::Empty,
    }
}

/// Read delimited text. The delimiter is guessed from the header line.
pub fn read_delimited(data: &[u8]) -> Result<RawTable, ReadError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let delimiter = detect_delimiter(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let row: Vec<RawCell> = record
            .iter()
            .map(|field| RawCell::text(String::from_utf8_lossy(field).into_owned()))
            .collect();
        rows.push(row);
    }

    split_header(rows)
}

/// Choose between `,`, `;` and tab by counting occurrences in the first
/// non-blank line.
pub fn detect_delimiter(data: &[u8]) -> u8 {
    let first_line = data
        .split(|b| *b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or(data);
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|candidate| {
            let count = first_line.iter().filter(|b| *b == candidate).count();
            // Prefer comma on ties.
            (count, *candidate == b',')
        })
        .unwrap_or(b',')
}

/// The first non-blank row is the header; everything after it is data.
fn split_header(rows: Vec<Vec<RawCell>>) -> Result<RawTable, ReadError> {
    let mut iter = rows.into_iter();
    let header_row = iter
        .by_ref()
        .find(|row| row.iter().any(|cell| !cell.is_blank()))
        .ok_or(ReadError::NoHeader)?;

    let headers = header_row
        .iter()
        .map(|cell| match cell {
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(v) => v.to_string(),
            RawCell::Date(d) => d.to_string(),
            RawCell::Empty => String::new(),
        })
        .collect();

    Ok(RawTable::new(headers, iter.collect()))
}
