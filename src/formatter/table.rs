//! Table formatting using tabled
//!
//! Listings (content types, languages, filter operators) and the per-language
//! export summary are rendered through one [`TableFormatter`] so they share
//! style and width limits.

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::export::LanguageReport;
use crate::filter::{self, FILTERABLE_TYPES};
use crate::model::ElementType;
use crate::repository::{ContentTypeSchema, LanguageDescriptor};

/// Maximum width for a single column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 48;

/// Table formatter for listings and reports
pub struct TableFormatter {
    max_column_width: usize,
    style: TableStyle,
    use_colors: bool,
}

/// Available table styles
#[derive(Debug, Clone, Copy)]
pub enum TableStyle {
    /// Modern style with box-drawing characters
    Modern,
    /// ASCII style with basic characters
    Ascii,
    Rounded,
    Markdown,
    Psql,
}

impl TableFormatter {
    /// Create a new table formatter with default settings
    pub fn new() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Rounded,
            use_colors: false,
        }
    }

    /// Create a new table formatter with color support
    ///
    /// # Arguments
    /// * `use_colors` - Enable colored headers
    ///
    /// # Returns
    /// * `Self` - New table formatter
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Content types with their element counts
    pub fn content_types(&self, types: &[ContentTypeSchema]) -> String {
        if types.is_empty() {
            return "(no content types)".to_string();
        }
        let rows = types.iter().map(|t| {
            let exportable = t
                .elements
                .iter()
                .filter(|(_, element_type)| *element_type != ElementType::Custom)
                .count();
            vec![t.codename.clone(), t.name.clone(), exportable.to_string()]
        });
        self.render(&["codename", "name", "columns"], rows)
    }

    /// Languages with the name used in export file names
    pub fn languages(&self, languages: &[LanguageDescriptor]) -> String {
        if languages.is_empty() {
            return "(no languages)".to_string();
        }
        let rows = languages.iter().map(|l| {
            vec![
                l.codename.clone(),
                l.name.clone(),
                crate::export::naming::sanitize_language_name(&l.name, &l.codename),
            ]
        });
        self.render(&["codename", "name", "file name"], rows)
    }

    /// Filter phrases for one element type, or for every filterable type
    pub fn operators(&self, element_type: Option<ElementType>) -> String {
        let types: Vec<ElementType> = match element_type {
            Some(t) => vec![t],
            None => FILTERABLE_TYPES.to_vec(),
        };

        let mut rows = Vec::new();
        for t in types {
            for (index, (phrase, operation)) in filter::phrases(t).iter().enumerate() {
                rows.push(vec![
                    t.to_string(),
                    phrase.to_string(),
                    operation.name().to_string(),
                    format!("{:?}", operation.arity()).to_lowercase(),
                    if index == 0 { "yes".into() } else { String::new() },
                ]);
            }
        }

        if rows.is_empty() {
            return "(no filter operators for this element type)".to_string();
        }
        self.render(&["element type", "phrase", "operation", "value", "default"], rows)
    }

    /// Per-language outcome of an export run
    pub fn language_reports(&self, reports: &[LanguageReport]) -> String {
        let rows = reports.iter().map(|r| {
            let worksheets = r
                .worksheets
                .iter()
                .map(|(content_type, rows)| format!("{content_type} ({rows})"))
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                r.codename.clone(),
                r.name.clone(),
                r.stats.items_found.to_string(),
                r.stats.items_exported.to_string(),
                r.stats.skipped().to_string(),
                match &r.error {
                    Some(_) => "failed".to_string(),
                    None => worksheets,
                },
            ]
        });
        self.render(
            &["language", "name", "found", "exported", "skipped", "worksheets"],
            rows,
        )
    }

    /// Render a header and rows into a styled table
    fn render<I>(&self, header: &[&str], rows: I) -> String
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.apply_style(&mut table);

        for i in 0..header.len() {
            table.with(Modify::new(Columns::new(i..=i)).with(Width::wrap(self.max_column_width)));
        }
        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        table.to_string()
    }

    fn apply_style(&self, table: &mut Table) {
        match self.style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Psql => table.with(Style::psql()),
        };
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}
