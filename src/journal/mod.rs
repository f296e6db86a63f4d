//! Journal module - loading ledger rows and normalizing them into typed lines.
//!
//! - `reader` decodes uploaded CSV/XLSX bytes into a raw header + rows table
//! - `normalizer` maps aliased headers onto the journal schema and coerces values
//! - `models` holds the raw and normalized row types

pub mod models;
pub mod normalizer;
pub mod reader;


pub use models::{JournalField, JournalLine, RawCell, RawTable, TransactionDate};
pub use normalizer::{normalize, voucher_ids, ColumnMapping};
pub use reader::{read_table, ReadError};

/// Read and normalize an upload in one step.
pub fn load_journal(data: &[u8], filename: &str) -> Result<Vec<JournalLine>, ReadError> {
    let table = read_table(data, filename)?;
    Ok(normalize(&table))
}
