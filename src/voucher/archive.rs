//! Batch generation: one PDF per voucher, bundled in a ZIP archive.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use log::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::settings::VoucherSettings;
use super::{render_pdf, RenderStatus, VoucherError};
use crate::journal::JournalLine;

pub const ARCHIVE_FILENAME: &str = "vouchers.zip";

#[derive(Debug, Clone)]
pub struct VoucherArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Ids written to the archive, in request order.
    pub included: Vec<String>,
    /// Requested ids that had no lines.
    pub skipped: Vec<String>,
    /// Degraded when any included voucher was.
    pub status: RenderStatus,
}

impl VoucherArchive {
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

/// Render every id in `ids` as PDF, sequentially. Duplicate ids are rendered
/// once and ids without lines are skipped.
pub fn render_archive(
    lines: &[JournalLine],
    ids: &[String],
    settings: &VoucherSettings,
) -> Result<VoucherArchive, VoucherError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut seen = HashSet::new();
    let mut entry_names = HashSet::new();
    let mut included = Vec::new();
    let mut skipped = Vec::new();
    let mut reasons = Vec::new();

    for id in ids {
        let id = id.trim();
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }

        let rendered = match render_pdf(lines, id, settings)? {
            Some(rendered) => rendered,
            None => {
                debug!("Skipping voucher '{}' in archive: no lines", id);
                skipped.push(id.to_string());
                continue;
            }
        };

        let entry_name = unique_entry_name(&mut entry_names, &rendered.filename);
        if entry_name != rendered.filename {
            debug!("Voucher '{}' archived as {} to avoid a name clash", id, entry_name);
        }
        writer.start_file(entry_name.as_str(), options)?;
        writer.write_all(&rendered.bytes)?;
        if let RenderStatus::Degraded(mut voucher_reasons) = rendered.status {
            reasons.append(&mut voucher_reasons);
        }
        included.push(rendered.voucher_id);
    }

    let bytes = writer.finish()?.into_inner();
    info!(
        "Built {} with {} voucher(s), {} skipped ({} bytes)",
        ARCHIVE_FILENAME,
        included.len(),
        skipped.len(),
        bytes.len()
    );

    Ok(VoucherArchive {
        filename: ARCHIVE_FILENAME.to_string(),
        bytes,
        included,
        skipped,
        status: RenderStatus::from_reasons(reasons),
    })
}

/// Distinct ids can sanitize to the same filename (`V1` and `v1`), so later
/// entries get a numeric suffix: `voucher-v1-2.pdf`.
fn unique_entry_name(taken: &mut HashSet<String>, filename: &str) -> String {
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, extension)) => (stem, format!(".{}", extension)),
        None => (filename, String::new()),
    };
    let mut candidate = filename.to_string();
    let mut counter = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}-{}{}", stem, counter, extension);
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_archive_skips_empty_and_duplicates() {
        let lines = vec![
            JournalLine::new("V1", "101", "Kas", "", 1_000, 0),
            JournalLine::new("V2", "102", "Bank", "", 0, 1_000),
        ];
        let archive = render_archive(
            &lines,
            &ids(&["V1", "V404", "V1", "V2"]),
            &VoucherSettings::default(),
        )
        .unwrap();

        assert_eq!(archive.filename, "vouchers.zip");
        assert_eq!(archive.included, ids(&["V1", "V2"]));
        assert_eq!(archive.skipped, ids(&["V404"]));

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert_eq!(zip.len(), 2);
        let mut entry = zip.by_name("voucher-v1.pdf").unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert!(content.starts_with(b"%PDF"));
    }

    #[test]
    fn test_colliding_filenames_get_suffixes() {
        let lines = vec![
            JournalLine::new("V1", "101", "Kas", "", 1_000, 0),
            JournalLine::new("v1", "102", "Bank", "", 2_000, 0),
            JournalLine::new("JV/001", "103", "Piutang", "", 3_000, 0),
            JournalLine::new("JV-001", "104", "Utang", "", 0, 4_000),
        ];
        let archive = render_archive(
            &lines,
            &ids(&["V1", "v1", "JV/001", "JV-001"]),
            &VoucherSettings::default(),
        )
        .unwrap();

        assert_eq!(archive.included, ids(&["V1", "v1", "JV/001", "JV-001"]));
        let zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "voucher-jv-001-2.pdf",
                "voucher-jv-001.pdf",
                "voucher-v1-2.pdf",
                "voucher-v1.pdf",
            ]
        );
    }

    #[test]
    fn test_unique_entry_name_counts_up() {
        let mut taken = HashSet::new();
        assert_eq!(unique_entry_name(&mut taken, "voucher.pdf"), "voucher.pdf");
        assert_eq!(unique_entry_name(&mut taken, "voucher.pdf"), "voucher-2.pdf");
        assert_eq!(unique_entry_name(&mut taken, "voucher.pdf"), "voucher-3.pdf");
        assert_eq!(unique_entry_name(&mut taken, "voucher-2.pdf"), "voucher-2-2.pdf");
    }

    #[test]
    fn test_archive_of_nothing_is_empty() {
        let archive = render_archive(&[], &ids(&["V1"]), &VoucherSettings::default()).unwrap();
        assert!(archive.is_empty());
        assert_eq!(archive.skipped, ids(&["V1"]));
    }
}
