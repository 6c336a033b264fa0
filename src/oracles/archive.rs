//! ZIP archive entry extraction

use crate::error::EvaluationError;
use crate::oracles::EntryExtractor;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::ZipArchive;

pub const DEFAULT_EXTENSIONS: [&str; 4] = [".txt", ".md", ".csv", ".json"];

/// Decompressed size above which an entry is skipped
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Keeps text-like entries, decoded as UTF-8 with invalid sequences dropped
#[derive(Debug, Clone)]
pub struct ZipEntryExtractor {
    extensions: Vec<String>,
    max_entry_bytes: u64,
}

impl ZipEntryExtractor {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }

    pub fn with_max_entry_bytes(mut self, max_entry_bytes: u64) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self
    }

    pub fn accepts(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.extensions.iter().any(|ext| lowered.ends_with(ext.as_str()))
    }
}

impl Default for ZipEntryExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// UTF-8 decode that drops undecodable bytes instead of replacing them
pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

impl EntryExtractor for ZipEntryExtractor {
    fn extract_entries(&self, archive: &[u8]) -> Result<BTreeMap<String, String>, EvaluationError> {
        let mut zip = ZipArchive::new(Cursor::new(archive))
            .map_err(|err| EvaluationError::InvalidArchive(err.to_string()))?;

        let mut entries = BTreeMap::new();
        for index in 0..zip.len() {
            let mut file = match zip.by_index(index) {
                Ok(file) => file,
                Err(err) => {
                    warn!(index = index, error = %err, "Skipping unreadable archive entry");
                    continue;
                }
            };
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            if !self.accepts(&name) {
                debug!(entry = %name, "Skipping entry with unsupported extension");
                continue;
            }

            // Declared sizes are untrusted; the read itself is bounded
            let limit = self.max_entry_bytes;
            let mut bytes = Vec::with_capacity(file.size().min(limit) as usize);
            if let Err(err) = (&mut file).take(limit + 1).read_to_end(&mut bytes) {
                warn!(entry = %name, error = %err, "Skipping unreadable archive entry");
                continue;
            }
            if bytes.len() as u64 > limit {
                warn!(entry = %name, limit_bytes = limit, "Skipping oversized archive entry");
                continue;
            }
            entries.insert(name, decode_dropping_invalid(&bytes));
        }

        debug!(entries = entries.len(), "Archive entries extracted");
        Ok(entries)
    }
}
