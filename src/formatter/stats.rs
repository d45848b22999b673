//! Export run summary
//!
//! Renders an [`ExportReport`] for the terminal: the saved file, totals, a
//! per-language table and every notice.

use std::path::Path;

use crate::export::ExportReport;

use super::colorizer::Colorizer;
use super::table::TableFormatter;

/// Summary formatter for export runs
pub struct SummaryFormatter {
    colorizer: Colorizer,
    table: TableFormatter,
    /// Show the per-language table
    show_languages: bool,
}

impl SummaryFormatter {
    /// Create a new summary formatter
    ///
    /// # Arguments
    /// * `use_colors` - Enable colored output
    /// * `show_languages` - Include the per-language table
    ///
    /// # Returns
    /// * `Self` - New formatter
    pub fn new(use_colors: bool, show_languages: bool) -> Self {
        Self {
            colorizer: Colorizer::new(use_colors),
            table: TableFormatter::with_colors(use_colors),
            show_languages,
        }
    }

    /// Format a finished run
    ///
    /// # Arguments
    /// * `report` - Run report
    /// * `saved_to` - Where the package was written, if it was
    ///
    /// # Returns
    /// * `String` - Multi-line summary
    pub fn format(&self, report: &ExportReport, saved_to: Option<&Path>) -> String {
        let mut lines = Vec::new();

        match (&report.output, saved_to) {
            (Some(output), Some(path)) => lines.push(self.colorizer.success(&format!(
                "Exported {} of {} item(s) to {} ({})",
                report.total_exported(),
                report.total_found(),
                path.display(),
                output.kind
            ))),
            (Some(output), None) => lines.push(self.colorizer.success(&format!(
                "Packaged {} of {} item(s) as {} ({})",
                report.total_exported(),
                report.total_found(),
                output.file_name,
                output.kind
            ))),
            (None, _) => lines.push(self.colorizer.error("Export failed: nothing was exported")),
        }

        if let Some(output) = &report.output {
            if !output.entries.is_empty() {
                lines.push(self.colorizer.dim(&format!("  contents: {}", output.entries.join(", "))));
            }
        }

        if self.show_languages && !report.languages.is_empty() {
            lines.push(self.table.language_reports(&report.languages));
        }

        for notice in &report.notices {
            lines.push(self.colorizer.notice(notice));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{
        ExportRunStats, LanguageReport, Notice, NoticeKind, PackageKind, PackagedExport, Severity,
    };
    use crate::model::FileFormat;

    fn report(output: Option<PackagedExport>, notices: Vec<Notice>) -> ExportReport {
        ExportReport {
            environment_id: "env".into(),
            file_format: FileFormat::Excel,
            languages: vec![LanguageReport {
                codename: "en-US".into(),
                name: "English".into(),
                stats: ExportRunStats::new(4, 3),
                total_count: 4,
                worksheets: vec![("article".into(), 3)],
                divergent_types: Vec::new(),
                error: None,
            }],
            notices,
            output,
        }
    }

    #[test]
    fn test_success_summary() {
        let output = PackagedExport {
            file_name: "env-English-export-2024-07-09.xlsx".into(),
            bytes: Vec::new(),
            kind: PackageKind::Workbook,
            entries: vec!["article".into()],
        };
        let notice = Notice::for_language(
            "en-US",
            Severity::Warning,
            NoticeKind::SomeSkipped { found: 4, exported: 3 },
        );
        let text = SummaryFormatter::new(false, false).format(
            &report(Some(output), vec![notice]),
            Some(Path::new("out/env-English-export-2024-07-09.xlsx")),
        );

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Exported 3 of 4 item(s) to out/env-English-export-2024-07-09.xlsx (Excel workbook)"
        );
        assert_eq!(lines[1], "  contents: article");
        assert_eq!(lines[2], "! [en-US] 1 of 4 item(s) had no content and were skipped");
    }

    #[test]
    fn test_failure_summary() {
        let text = SummaryFormatter::new(false, true)
            .format(&report(None, vec![Notice::global_no_items()]), None);
        assert!(text.starts_with("Error: Export failed"));
        assert!(text.contains("en-US"));
        assert!(text.ends_with("Choose another workflow step or content type."));
    }
}
