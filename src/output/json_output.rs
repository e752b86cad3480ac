//! JSON snapshot sink

use crate::output::traits::{OutputResult, SnapshotSink};
use crate::output::write_replacing;
use crate::record::BookRecord;
use std::path::{Path, PathBuf};

/// Writes the records as a pretty-printed JSON array
///
/// List fields stay arrays and absent values are `null`.
pub struct JsonSnapshotSink {
    path: PathBuf,
}

impl JsonSnapshotSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SnapshotSink for JsonSnapshotSink {
    fn write_snapshot(&self, records: &[BookRecord]) -> OutputResult<()> {
        write_replacing(&self.path, |file| {
            serde_json::to_writer_pretty(file, records)?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
