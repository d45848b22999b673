//! Content Export Library
//!
//! Fetches content items from a headless-CMS Delivery API and turns them
//! into spreadsheets: one worksheet per content type and language, packaged
//! as an Excel workbook, a ZIP of workbooks, or a ZIP of CSV files.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Projection, grouping, statistics, writers and orchestration
//! - `filter`: Filter operator registry
//! - `formatter`: Terminal output formatting
//! - `model`: Content items and export requests
//! - `repository`: Delivery API client and credential probe
//!
//! # Example
//!
//! ```no_run
//! use content_export::config::DeliveryConfig;
//! use content_export::repository::{Credentials, DeliveryClient, probe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::resolve(
//!         Some("975bf280-fd91-488c-994c-2f04416e5ee3"),
//!         Some("api-key"),
//!     )?;
//!     let client = DeliveryClient::new(
//!         credentials.environment_id,
//!         credentials.api_key,
//!         DeliveryConfig::default(),
//!     )?;
//!
//!     let catalog = probe(&client).await?;
//!     println!("{} content types", catalog.content_types.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod formatter;
pub mod model;
pub mod repository;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{ExportOrchestrator, ExportReport};
pub use model::{ExportRequest, FileFormat, WorkflowStep};
pub use repository::{ContentRepository, DeliveryClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
