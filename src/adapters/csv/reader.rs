//! CSV Row Source - Station Snapshot File Reading
//!
//! Reads the whole snapshot file in one scoped acquisition (open, read,
//! release) per poll. Header names are handed to `Snapshot::new`, which
//! strips the WeeWX comment prefix (`#dateTime`, ...) and whitespace.
//!
//! Tokenizing only: no schema inference, no type coercion. Everything
//! beyond splitting fields is the evaluator's business.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::ReaderBuilder;
use tracing::debug;

use crate::domain::snapshot::Snapshot;
use crate::ports::row_source::{RowSource, SourceError};

/// `RowSource` implementation backed by a local CSV file.
pub struct CsvRowSource {
    /// Path to the snapshot file (typically on a ramdisk).
    path: PathBuf,
}

impl CsvRowSource {
    /// Create a source for the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Tokenize file contents into a snapshot.
    ///
    /// Ragged rows are tolerated (`flexible`): a truncated trailing line
    /// from a mid-write read should not poison the whole snapshot.
    fn parse(&self, content: &str) -> Result<Snapshot, SourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| SourceError::Malformed(e.to_string()))?
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| SourceError::Malformed(e.to_string()))?;
            rows.push(record.iter().map(ToString::to_string).collect());
        }

        debug!(
            path = %self.path.display(),
            columns = columns.len(),
            rows = rows.len(),
            "Snapshot file read"
        );
        Ok(Snapshot::new(columns, rows))
    }
}

#[async_trait]
impl RowSource for CsvRowSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SourceError::NotFound {
                    path: self.path.display().to_string(),
                },
                _ => SourceError::Io(e),
            })?;
        self.parse(&content)
    }
}
