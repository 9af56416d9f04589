//! Append-only metadata ledger written next to the generated images.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::AppResult;

pub const LEDGER_FILE: &str = "metadata.csv";
pub const LEDGER_COLUMNS: [&str; 7] = ["index", "filename", "doctor_id", "doctor_name", "prompt", "backend", "seed"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub index: usize,
    pub filename: String,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub prompt: String,
    pub backend: String,
    pub seed: u32,
}

pub struct Ledger<W: Write = File> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl Ledger<File> {
    /// Create (or truncate) the ledger and write its header.
    pub fn create(path: &Path) -> AppResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> Ledger<W> {
    pub fn from_writer(inner: W) -> AppResult<Self> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(LEDGER_COLUMNS)?;
        writer.flush()?;
        Ok(Ledger { writer, rows: 0 })
    }

    /// Write one row and flush it so the file is complete after every item.
    pub fn append(&mut self, record: &MetadataRecord) -> AppResult<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> AppResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::AppError::Io(e.into_error()))
    }
}
