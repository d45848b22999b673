//! Item-to-spreadsheet pipeline
//!
//! Content flows one way per language:
//!
//! 1. **Projection** turns each item into a flat row of cells
//! 2. **Grouping** splits the type-ordered items into one worksheet per type
//! 3. **Stats** classify how completely each language was exported
//! 4. **Writers** encode worksheets as XLSX or CSV and bundle them into ZIPs
//!
//! The [`ExportOrchestrator`] runs that pipeline for every selected language
//! and decides how the result is packaged.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use content_export::config::DeliveryConfig;
//! use content_export::export::{ExportOptions, ExportOrchestrator};
//! use content_export::model::{ExportRequest, FileFormat, WorkflowStep};
//! use content_export::repository::{DeliveryClient, probe};
//!
//! # async fn run() -> content_export::error::Result<()> {
//! let client = DeliveryClient::new(
//!     "975bf280-fd91-488c-994c-2f04416e5ee3",
//!     "api-key",
//!     DeliveryConfig::default(),
//! )?;
//! let catalog = probe(&client).await?;
//!
//! let request = ExportRequest::builder()
//!     .content_types(["article"])
//!     .languages(["en-US"])
//!     .workflow_step(Some(WorkflowStep::Published))
//!     .file_format(Some(FileFormat::Excel))
//!     .build()?;
//!
//! let options = ExportOptions { concurrency: 1, export_date: Local::now().date_naive() };
//! let report = ExportOrchestrator::new(&client, &catalog, options).run(&request).await?;
//! if let Some(output) = &report.output {
//!     output.save_to(std::path::Path::new(".")).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod grouping;
pub mod naming;
pub mod package;
pub mod progress;
pub mod projection;
pub mod stats;
pub mod writers;

pub use coordinator::{ExportOptions, ExportOrchestrator, ExportPhase, ExportReport, LanguageReport};
pub use grouping::{Assembly, WorksheetGroup, assemble};
pub use package::{PackageKind, PackagedExport};
pub use progress::ProgressTracker;
pub use projection::{Cell, ExportRow, project_row};
pub use stats::{ExportRunStats, LanguageStatus, Notice, NoticeKind, NoticeScope, Severity};
