use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;

use crate::data::error::ExportError;
use crate::data::model::{Column, Dataset, DatasetId};

// ---------------------------------------------------------------------------
// CSV serialization
// ---------------------------------------------------------------------------

pub const EXPORT_EXTENSION: &str = "csv";

/// Serialize `rows` of `dataset` restricted to `columns` as UTF-8 CSV.
///
/// Header row = column headers, one line per sale, comma separated.
pub fn to_csv(dataset: &Dataset, rows: &[usize], columns: &[Column]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.header()))?;
    for record in rows.iter().filter_map(|&i| dataset.records().get(i)) {
        writer.write_record(columns.iter().map(|&c| record.cell(c).to_string()))?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Download file name: the user's stem with the `.csv` extension forced.
pub fn export_file_name(stem: &str, fallback: &str) -> String {
    let stem = stem.trim();
    let stem = if stem.is_empty() { fallback } else { stem };
    let suffix = format!(".{EXPORT_EXTENSION}");
    if stem.to_ascii_lowercase().ends_with(&suffix) {
        stem.to_string()
    } else {
        format!("{stem}{suffix}")
    }
}

/// Same as [`export_file_name`] for a path picked in a save dialog.
pub fn ensure_csv_extension(path: PathBuf) -> PathBuf {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(EXPORT_EXTENSION));
    if is_csv {
        return path;
    }
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(EXPORT_EXTENSION);
    path.with_file_name(name)
}

pub fn write_export(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes)?;
    log::info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Memoized export bytes
// ---------------------------------------------------------------------------

/// Identity of one export: which dataset, which columns, which rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportKey {
    pub dataset: DatasetId,
    pub columns: Vec<Column>,
    pub rows: Vec<usize>,
}

/// Bounded least-recently-used cache of serialized exports.
///
/// Entries are only ever looked up by full key equality; nothing is
/// invalidated behind the caller's back.
#[derive(Debug)]
pub struct ExportCache {
    entries: LruCache<ExportKey, Arc<[u8]>>,
}

impl ExportCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// CSV bytes for `rows`/`columns` of `dataset`, serialized at most once per key.
    pub fn get_or_export(
        &mut self,
        dataset: &Dataset,
        rows: &[usize],
        columns: &[Column],
    ) -> Result<Arc<[u8]>, ExportError> {
        let key = ExportKey {
            dataset: dataset.id(),
            columns: columns.to_vec(),
            rows: rows.to_vec(),
        };

        if let Some(bytes) = self.entries.get(&key) {
            log::debug!("Export cache hit ({} rows)", rows.len());
            return Ok(Arc::clone(bytes));
        }

        log::debug!("Export cache miss ({} rows, {} columns)", rows.len(), columns.len());
        let bytes: Arc<[u8]> = to_csv(dataset, rows, columns)?.into();
        self.entries.put(key, Arc::clone(&bytes));
        Ok(bytes)
    }
}
