use std::io::{Cursor, Write};

use bytes::Bytes;
use indexmap::IndexMap;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// Accumulates per-card payloads and packages them into a single ZIP.
///
/// Entries keep insertion order. Adding a payload under a name that is
/// already present replaces the earlier payload in place: the later bytes
/// win, the entry keeps its original position.
#[derive(Debug, Default)]
pub struct Assembler {
    entries: IndexMap<String, Bytes>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, payload: Bytes) {
        self.entries.insert(name.into(), payload);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Encode the accumulated entries as a deflate-compressed ZIP.
    ///
    /// An assembler with zero entries still encodes to a valid, empty
    /// archive.
    pub fn finalize(self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, payload) in &self.entries {
            writer
                .start_file(name.as_str(), opts)
                .map_err(|source| Error::Entry {
                    name: name.clone(),
                    source,
                })?;
            writer.write_all(payload).map_err(|source| Error::Entry {
                name: name.clone(),
                source: source.into(),
            })?;
        }

        let cursor = writer.finish().map_err(|source| Error::Finalize { source })?;
        Ok(cursor.into_inner())
    }
}
