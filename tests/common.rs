#![allow(dead_code)]

use jurnal_voucher_server::journal::{load_journal, JournalLine};
use jurnal_voucher_server::voucher::VoucherSettings;

pub const BOUNDARY: &str = "----jurnal-voucher-test-boundary";

/// Two vouchers: V1 posts 500.000 against capital, V2 a small cash payment.
pub const JOURNAL_CSV: &str = "\
Tanggal,No. Voucher,Kode Akun,Nama Akun,Keterangan,Debet,Kredit
05/01/2024,V1,101,Kas,Setoran modal awal,500000,0
05/01/2024,V1,301,Modal Disetor,Setoran modal awal,0,500000
06/01/2024,V2,601,Beban Listrik,Tagihan listrik Januari,\"Rp 125.000\",0
06/01/2024,V2,101,Kas,Tagihan listrik Januari,0,125000
";

pub fn journal_lines() -> Vec<JournalLine> {
    load_journal(JOURNAL_CSV.as_bytes(), "jurnal.csv").expect("fixture journal should load")
}

pub fn company_settings() -> VoucherSettings {
    VoucherSettings {
        company_name: "PT Maju Jaya".to_string(),
        company_address: "Jl. Merdeka No. 1\nJakarta Pusat".to_string(),
        approver_name: "Budi Santoso".to_string(),
        preparer_name: "Sari Dewi".to_string(),
        ..Default::default()
    }
}

/// One multipart form part: field name, optional filename, content.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }
}

/// Encode `parts` as a `multipart/form-data` body. Returns the content type
/// header value and the body.
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
