//! CSV metadata table
//!
//! The header is written once, when the table is first opened while missing or
//! empty. Each row is flushed as soon as it is appended.

use crate::crawler::{VeteranRecord, METADATA_HEADER};
use crate::output::traits::{MetadataSink, SinkResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Appends [`VeteranRecord`]s to a UTF-8 CSV file
pub struct CsvMetadataSink {
    path: PathBuf,
    utf8_bom: bool,
    writer: Option<csv::Writer<File>>,
    rows: u64,
}

impl CsvMetadataSink {
    /// Creates a sink; the file is opened lazily on the first append
    pub fn new(path: impl Into<PathBuf>, utf8_bom: bool) -> Self {
        Self {
            path: path.into(),
            utf8_bom,
            writer: None,
            rows: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_writer(&self) -> SinkResult<csv::Writer<File>> {
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if needs_header && self.utf8_bom {
            file.write_all(UTF8_BOM)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(METADATA_HEADER)?;
            writer.flush()?;
            tracing::info!("Created metadata table at '{}'", self.path.display());
        }

        Ok(writer)
    }

    fn write_row(&mut self, record: &VeteranRecord) -> SinkResult<()> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open_writer()?,
        };
        let writer = self.writer.insert(writer);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

impl MetadataSink for CsvMetadataSink {
    fn append(&mut self, record: &VeteranRecord) -> SinkResult<()> {
        match self.write_row(record) {
            Ok(()) => {
                self.rows += 1;
                Ok(())
            }
            Err(e) => {
                // Reopen on the next append rather than reuse a broken writer
                self.writer = None;
                Err(e)
            }
        }
    }

    fn rows_written(&self) -> u64 {
        self.rows
    }
}
