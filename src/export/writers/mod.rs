//! Output encoders
//!
//! Everything is encoded in memory; nothing touches the output directory
//! until a complete package exists.

pub mod archive;
pub mod csv;
pub mod xlsx;

pub use archive::ZipArchiveWriter;
pub use csv::CsvSheetWriter;
pub use xlsx::XlsxWorkbookWriter;
