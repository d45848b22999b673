//! Terminal output formatting
//!
//! - Table formatting for listings and per-language results
//! - Run summaries with colored notices
//! - JSON rendering for machine-readable output

use serde::Serialize;

use crate::error::Result;

pub mod colorizer;
pub mod stats;
pub mod table;

pub use colorizer::Colorizer;
pub use stats::SummaryFormatter;
pub use table::{TableFormatter, TableStyle};

/// Render any serializable value as pretty JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to render JSON: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportRunStats;

    #[test]
    fn test_to_json() {
        let json = to_json(&ExportRunStats::new(2, 1)).unwrap();
        assert!(json.contains("\"items_found\": 2"));
    }
}
