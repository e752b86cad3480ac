//! Output module for persisting harvested records
//!
//! This module handles:
//! - The snapshot sink interface used by the worker pool
//! - CSV and JSON snapshot files
//! - Harvest statistics and their printout

mod csv_output;
mod json_output;
pub mod stats;
mod traits;

pub use csv_output::CsvSnapshotSink;
pub use json_output::JsonSnapshotSink;
pub use stats::{print_report, CatalogStatistics, HarvestReport};
pub use traits::{OutputError, OutputResult, SnapshotSink};

use crate::config::{OutputConfig, OutputFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the sink described by the output configuration
pub fn open_sink(config: &OutputConfig) -> Arc<dyn SnapshotSink> {
    match config.format {
        OutputFormat::Csv => Arc::new(CsvSnapshotSink::new(&config.path, config.bom)),
        OutputFormat::Json => Arc::new(JsonSnapshotSink::new(&config.path)),
    }
}

/// Writes a file through a sibling temporary file and renames it into place
///
/// Readers of `path` see either the previous snapshot or the new one, never a
/// partially written file.
pub(crate) fn write_replacing<F>(path: &Path, write: F) -> OutputResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> OutputResult<()>,
{
    let tmp_path = temporary_path(path);

    let file = File::create(&tmp_path).map_err(|e| OutputError::Write {
        path: tmp_path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    let result = write(&mut writer).and_then(|()| {
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    });

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    drop(writer);

    std::fs::rename(&tmp_path, path).map_err(|e| OutputError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
