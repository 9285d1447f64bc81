//! Record sinks
//!
//! The CSV output table writes the header once at creation and flushes
//! after every row, so a run that aborts midway leaves all rows written so
//! far readable on disk.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tracing::debug;

use super::error::{HarvestError, HarvestResult};
use crate::domain::record::{RECORD_HEADER, Record};

/// Destination for harvested records, in emission order
pub trait RecordSink {
    fn append(&mut self, record: &Record) -> HarvestResult<()>;

    fn finish(&mut self) -> HarvestResult<()> {
        Ok(())
    }
}

/// Comma-separated output table at `{dir}/{date}_{store}.csv`
pub struct CsvOutputTable {
    path: PathBuf,
    writer: Writer<File>,
    rows: usize,
}

impl CsvOutputTable {
    /// Create the parent directory if needed, truncate any existing file,
    /// and write the header row.
    pub fn create(path: &Path) -> HarvestResult<Self> {
        let setup_error = |source: std::io::Error| HarvestError::Setup {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(setup_error)?;
        }
        let file = File::create(path).map_err(setup_error)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(RECORD_HEADER)
            .map_err(|e| setup_error(e.into()))?;
        writer.flush().map_err(setup_error)?;

        debug!("Created output table {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl RecordSink for CsvOutputTable {
    fn append(&mut self, record: &Record) -> HarvestResult<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> HarvestResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Record>,
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &Record) -> HarvestResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
