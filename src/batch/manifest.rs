//! Optional doctor manifest: a header-bearing CSV with one row per image.
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, AppResult};

const ID_COLUMNS: [&str; 3] = ["id", "doctor_id", "index"];
const NAME_COLUMNS: [&str; 2] = ["name", "doctor_name"];

/// Short rows are accepted; missing trailing cells read as absent.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true);
    builder
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRow {
    columns: HashMap<String, String>,
}

impl ManifestRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    fn first_present(&self, columns: &[&str]) -> Option<&str> {
        columns
            .iter()
            .filter_map(|c| self.get(c))
            .find(|v| !v.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.first_present(&ID_COLUMNS)
    }

    pub fn name(&self) -> Option<&str> {
        self.first_present(&NAME_COLUMNS)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    rows: Vec<ManifestRow>,
}

impl Manifest {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let reader = reader_builder().from_path(path).map_err(|source| AppError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_rows(reader).map_err(|source| AppError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        Self::read_rows(reader_builder().from_reader(rdr))
    }

    fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let columns = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.trim().to_string(), v.to_string()))
                .collect();
            rows.push(ManifestRow { columns });
        }
        tracing::debug!("Loaded {} manifest rows", rows.len());
        Ok(Manifest { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&ManifestRow> {
        self.rows.get(index)
    }
}
