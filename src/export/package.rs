//! Packaged export output and saving it to disk

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Shape of the produced file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    /// A single `.xlsx` workbook
    Workbook,
    /// A ZIP with one workbook per language
    WorkbookArchive,
    /// A ZIP of CSV files grouped by language
    CsvArchive,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PackageKind::Workbook => "Excel workbook",
            PackageKind::WorkbookArchive => "ZIP of Excel workbooks",
            PackageKind::CsvArchive => "ZIP of CSV files",
        };
        f.write_str(label)
    }
}

/// A complete export file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub kind: PackageKind,
    /// Sheet names for a workbook, entry names for an archive
    pub entries: Vec<String>,
}

impl PackagedExport {
    /// Write the package into `dir`.
    ///
    /// Bytes go to a `.part` file first and are renamed into place, so an
    /// interrupted write never leaves a truncated export behind.
    ///
    /// # Arguments
    /// * `dir` - Output directory, created if missing
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Path of the written file
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;

        let target = dir.join(&self.file_name);
        let partial = dir.join(format!("{}.part", self.file_name));

        debug!("Writing {} bytes to {}", self.bytes.len(), partial.display());
        if let Err(e) = fs::write(&partial, &self.bytes).await {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                warn!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e.into());
        }
        fs::rename(&partial, &target).await?;

        info!("Saved {} ({})", target.display(), self.kind);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package() -> PackagedExport {
        PackagedExport {
            file_name: "env-export-2024-07-09.zip".into(),
            bytes: b"PK\x05\x06".to_vec(),
            kind: PackageKind::CsvArchive,
            entries: vec!["English/article.csv".into()],
        }
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");

        let path = package().save_to(&out).await.unwrap();

        assert_eq!(path, out.join("env-export-2024-07-09.zip"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x05\x06");
        assert!(!out.join("env-export-2024-07-09.zip.part").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("env-export-2024-07-09.zip"), b"old").unwrap();

        let path = package().save_to(dir.path()).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"PK\x05\x06");
    }
}
