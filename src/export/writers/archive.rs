//! ZIP archive writer

use std::io::{Cursor, Write};

use tracing::debug;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::PackagingError;
use crate::export::naming::UniqueNames;

/// Collects named entries into an in-memory ZIP archive
pub struct ZipArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: UniqueNames,
    entries: Vec<String>,
}

impl ZipArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            names: UniqueNames::new(),
            entries: Vec::new(),
        }
    }

    /// Add an entry, returning the name it was stored under
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<String, PackagingError> {
        let name = self.names.claim(name);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name.as_str(), options)?;
        self.zip
            .write_all(bytes)
            .map_err(|e| PackagingError::Archive(e.to_string()))?;

        debug!("Added archive entry {} ({} bytes)", name, bytes.len());
        self.entries.push(name.clone());
        Ok(name)
    }

    /// Entry names in insertion order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Close the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>, PackagingError> {
        if self.entries.is_empty() {
            return Err(PackagingError::NothingToPackage);
        }
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
