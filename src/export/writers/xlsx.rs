//! Excel workbook writer
//!
//! One sheet per worksheet group: a bold header row followed by the data
//! rows. Numbers are written as numeric cells, everything else as text.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, warn};

use crate::error::PackagingError;
use crate::export::grouping::WorksheetGroup;
use crate::export::naming::{MAX_SHEET_NAME_LEN, UniqueNames, sanitize_sheet_name};
use crate::export::projection::Cell;

/// Longest string Excel stores in a cell
const MAX_CELL_CHARS: usize = 32_767;

/// Builds one `.xlsx` workbook in memory
pub struct XlsxWorkbookWriter {
    workbook: Workbook,
    header_format: Format,
    sheet_names: UniqueNames,
    sheets: Vec<String>,
}

impl XlsxWorkbookWriter {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header_format: Format::new().set_bold(),
            sheet_names: UniqueNames::with_max_len(MAX_SHEET_NAME_LEN),
            sheets: Vec::new(),
        }
    }

    /// Sheet names written so far, in order
    pub fn sheet_names(&self) -> &[String] {
        &self.sheets
    }

    fn write_cell(
        sheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &Cell,
    ) -> Result<(), PackagingError> {
        match cell {
            Cell::Number(n) => {
                sheet.write_number(row, col, *n)?;
            }
            Cell::Text(s) => {
                sheet.write_string(row, col, truncate_cell(s))?;
            }
            Cell::Empty => {}
        }
        Ok(())
    }

    /// Append a group as a new sheet, returning the sheet name used
    pub fn add_group(&mut self, group: &WorksheetGroup) -> Result<String, PackagingError> {
        let name = self.sheet_names.claim(&sanitize_sheet_name(&group.sheet_name));
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(&name)?;

        for (col, title) in group.header.iter().enumerate() {
            sheet.write_string_with_format(0, column(col)?, title, &self.header_format)?;
        }
        for (index, row) in group.rows.iter().enumerate() {
            let row_num = u32::try_from(index + 1)
                .map_err(|_| PackagingError::Workbook(format!("too many rows in '{name}'")))?;
            for (col, cell) in row.iter().enumerate() {
                Self::write_cell(sheet, row_num, column(col)?, cell)?;
            }
        }

        debug!("Added sheet '{}' with {} row(s)", name, group.rows.len());
        self.sheets.push(name.clone());
        Ok(name)
    }

    /// Serialize the workbook
    pub fn finish(mut self) -> Result<Vec<u8>, PackagingError> {
        if self.sheets.is_empty() {
            return Err(PackagingError::NothingToPackage);
        }
        Ok(self.workbook.save_to_buffer()?)
    }
}

impl Default for XlsxWorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column(index: usize) -> Result<u16, PackagingError> {
    u16::try_from(index).map_err(|_| PackagingError::Workbook(format!("column {index} out of range")))
}

fn truncate_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!("Cell value longer than {} characters was truncated", MAX_CELL_CHARS);
            &value[..cut]
        }
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(sheet_name: &str) -> WorksheetGroup {
        WorksheetGroup {
            language: "en-US".into(),
            content_type: sheet_name.into(),
            sheet_name: sheet_name.into(),
            header: vec!["title".into(), "price".into()],
            rows: vec![
                vec![Cell::Text("Mug".into()), Cell::Number(9.5)],
                vec![Cell::Text("Free sample".into()), Cell::Empty],
            ],
        }
    }

    #[test]
    fn test_workbook_bytes_are_a_zip_package() {
        let mut writer = XlsxWorkbookWriter::new();
        writer.add_group(&group("product")).unwrap();
        let bytes = writer.finish().unwrap();
        assert!(bytes.starts_with(b"PK"));

        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert!(archive.file_names().any(|n| n == "xl/worksheets/sheet1.xml"));
    }

    #[test]
    fn test_colliding_sheet_names_are_suffixed() {
        let mut writer = XlsxWorkbookWriter::new();
        let long = "product_variant_with_a_long_codename_a";
        let other = "product_variant_with_a_long_codename_b";
        assert_eq!(writer.add_group(&group(long)).unwrap(), "product_variant_with_a_long_cod");
        assert_eq!(writer.add_group(&group(other)).unwrap(), "product_variant_with_a_long_c~2");
        assert_eq!(writer.sheet_names().len(), 2);
        assert!(writer.finish().is_ok());
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let writer = XlsxWorkbookWriter::new();
        assert!(matches!(writer.finish(), Err(PackagingError::NothingToPackage)));
    }

    #[test]
    fn test_truncate_cell() {
        let long = "x".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(truncate_cell(&long).len(), MAX_CELL_CHARS);
        assert_eq!(truncate_cell("short"), "short");
    }
}
