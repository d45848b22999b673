//! CSV writer
//!
//! Each worksheet group becomes one CSV document: the header record followed
//! by one record per row, quoted as RFC 4180 requires.

use tracing::debug;

use crate::error::PackagingError;
use crate::export::grouping::WorksheetGroup;

/// Encodes worksheet groups as CSV text
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSheetWriter;

impl CsvSheetWriter {
    pub fn new() -> Self {
        Self
    }

    /// Encode one group
    ///
    /// # Arguments
    /// * `group` - Worksheet to encode
    ///
    /// # Returns
    /// * `Result<Vec<u8>, PackagingError>` - UTF-8 CSV bytes
    pub fn encode(&self, group: &WorksheetGroup) -> Result<Vec<u8>, PackagingError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(&group.header)?;
        for row in &group.rows {
            writer.write_record(row.iter().map(|cell| cell.to_plain()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PackagingError::Csv(e.to_string()))?;
        debug!(
            "Encoded {} as CSV: {} row(s), {} bytes",
            group.sheet_name,
            group.rows.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::projection::Cell;

    #[test]
    fn test_encode_quotes_values() {
        let group = WorksheetGroup {
            language: "en-US".into(),
            content_type: "article".into(),
            sheet_name: "article".into(),
            header: vec!["title".into(), "related".into(), "rating".into()],
            rows: vec![
                vec![
                    Cell::Text("Say \"hi\"".into()),
                    Cell::Text("a,b".into()),
                    Cell::Number(3.0),
                ],
                vec![Cell::Text("Plain".into()), Cell::Empty, Cell::Number(0.5)],
            ],
        };

        let text = String::from_utf8(CsvSheetWriter::new().encode(&group).unwrap()).unwrap();
        assert_eq!(
            text,
            "title,related,rating\n\"Say \"\"hi\"\"\",\"a,b\",3\nPlain,,0.5\n"
        );
    }

    #[test]
    fn test_rows_may_differ_from_header_width() {
        let group = WorksheetGroup {
            language: "en-US".into(),
            content_type: "page".into(),
            sheet_name: "page".into(),
            header: vec!["title".into()],
            rows: vec![vec![Cell::Text("A".into()), Cell::Text("extra".into())]],
        };
        let text = String::from_utf8(CsvSheetWriter::new().encode(&group).unwrap()).unwrap();
        assert_eq!(text, "title\nA,extra\n");
    }
}
