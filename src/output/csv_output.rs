//! CSV snapshot sink
//!
//! Writes one header row in [`COLUMNS`] order followed by one row per record.

use crate::output::traits::{OutputResult, SnapshotSink};
use crate::output::write_replacing;
use crate::record::{BookRecord, COLUMNS};
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV file sink
///
/// The optional byte order mark makes spreadsheet applications detect UTF-8,
/// which matters for Cyrillic titles and descriptions.
pub struct CsvSnapshotSink {
    path: PathBuf,
    bom: bool,
}

impl CsvSnapshotSink {
    /// Creates a sink writing to `path`
    pub fn new(path: impl AsRef<Path>, bom: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            bom,
        }
    }
}

impl SnapshotSink for CsvSnapshotSink {
    fn write_snapshot(&self, records: &[BookRecord]) -> OutputResult<()> {
        write_replacing(&self.path, |file| {
            if self.bom {
                file.write_all(UTF8_BOM)?;
            }

            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(COLUMNS)?;
            for record in records {
                writer.write_record(record.to_row())?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
