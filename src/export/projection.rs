//! Row projection
//!
//! Turns one content item into one flat row. Metadata columns come first, in
//! the order the user picked them, followed by one cell per element in
//! declaration order. Custom elements have no column.

use crate::model::{ContentItem, ElementType, ElementValue, MetadataField};

/// Separator for multi-valued elements
const LIST_SEPARATOR: &str = ",";

/// A single worksheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// Plain text rendering used by CSV output
    pub fn to_plain(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Ordered cells of one exported item
pub type ExportRow = Vec<Cell>;

/// Project an element value to a cell, or `None` for elements without a column
pub fn project_value(value: &ElementValue) -> Option<Cell> {
    let cell = match value {
        ElementValue::Text(s) | ElementValue::RichText(s) | ElementValue::UrlSlug(s) => {
            Cell::text(s.clone())
        }
        ElementValue::Number(n) => n.map(Cell::Number).unwrap_or(Cell::Empty),
        ElementValue::DateTime(d) => Cell::text(d.clone().unwrap_or_default()),
        ElementValue::ModularContent(codenames) | ElementValue::Subpages(codenames) => {
            Cell::text(codenames.join(LIST_SEPARATOR))
        }
        ElementValue::Asset(assets) => Cell::text(
            assets
                .iter()
                .map(|a| a.url.as_str())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        ),
        ElementValue::MultipleChoice(terms) | ElementValue::Taxonomy(terms) => Cell::text(
            terms
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        ),
        ElementValue::Custom(_) => return None,
    };
    Some(cell)
}

/// Project an item into a row
///
/// # Arguments
/// * `item` - Item to project
/// * `metadata` - Selected metadata columns, in selection order
///
/// # Returns
/// * `ExportRow` - Metadata cells followed by element cells
pub fn project_row(item: &ContentItem, metadata: &[MetadataField]) -> ExportRow {
    metadata
        .iter()
        .map(|field| Cell::text(field.extract(&item.system)))
        .chain(item.elements.iter().filter_map(|e| project_value(&e.value)))
        .collect()
}

/// Column headers for an item: metadata headers then element codenames
pub fn header_for(item: &ContentItem, metadata: &[MetadataField]) -> Vec<String> {
    metadata
        .iter()
        .map(|field| field.header().to_string())
        .chain(
            item.elements
                .iter()
                .filter(|e| e.element_type() != ElementType::Custom)
                .map(|e| e.codename.clone()),
        )
        .collect()
}

/// Whether the item produces a row.
///
/// Items without content are skipped unless metadata columns were selected,
/// in which case they still export their metadata with blank element cells.
pub fn is_exportable(item: &ContentItem, metadata: &[MetadataField]) -> bool {
    item.has_content() || !metadata.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::fixtures::item;
    use serde_json::json;

    fn article() -> ContentItem {
        item(
            "coffee_guide",
            "article",
            &[
                ("title", "text", json!("Coffee guide")),
                ("rating", "number", json!(4.5)),
                ("published", "date_time", json!("2024-03-01T00:00:00Z")),
                ("related", "modular_content", json!(["brewing", "roasting"])),
                (
                    "hero",
                    "asset",
                    json!([
                        { "name": "a.jpg", "url": "https://assets.example.com/a.jpg" },
                        { "name": "b.jpg", "url": "https://assets.example.com/b.jpg" }
                    ]),
                ),
                (
                    "tags",
                    "taxonomy",
                    json!([{ "name": "Coffee", "codename": "coffee" }, { "name": "Guides", "codename": "guides" }]),
                ),
                ("map", "custom", json!("{\"lat\":1}")),
                ("slug", "url_slug", json!("coffee-guide")),
            ],
        )
    }

    #[test]
    fn test_project_row_by_element_type() {
        let row = project_row(&article(), &[]);
        assert_eq!(
            row,
            vec![
                Cell::Text("Coffee guide".into()),
                Cell::Number(4.5),
                Cell::Text("2024-03-01T00:00:00Z".into()),
                Cell::Text("brewing,roasting".into()),
                Cell::Text("https://assets.example.com/a.jpg,https://assets.example.com/b.jpg".into()),
                Cell::Text("Coffee,Guides".into()),
                Cell::Text("coffee-guide".into()),
            ]
        );
    }

    #[test]
    fn test_header_skips_custom_elements() {
        assert_eq!(
            header_for(&article(), &[MetadataField::Codename, MetadataField::Id]),
            vec!["codename", "id", "title", "rating", "published", "related", "hero", "tags", "slug"]
        );
    }

    #[test]
    fn test_metadata_columns_lead_in_selection_order() {
        let row = project_row(&article(), &[MetadataField::LastModified, MetadataField::Name]);
        assert_eq!(row[0], Cell::Text("2024-05-01T10:00:00Z".into()));
        assert_eq!(row[1], Cell::Text("coffee guide".into()));
        assert_eq!(row[2], Cell::Text("Coffee guide".into()));
    }

    #[test]
    fn test_projection_is_repeatable() {
        let item = article();
        assert_eq!(project_row(&item, &[MetadataField::Id]), project_row(&item, &[MetadataField::Id]));
    }

    #[test]
    fn test_empty_item_exports_only_with_metadata() {
        let empty = item(
            "blank",
            "article",
            &[("title", "text", json!("")), ("related", "modular_content", json!([]))],
        );
        assert!(!is_exportable(&empty, &[]));
        assert!(is_exportable(&empty, &[MetadataField::Id]));

        let row = project_row(&empty, &[MetadataField::Id]);
        assert_eq!(row, vec![Cell::Text("id-blank".into()), Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn test_zero_number_is_a_value() {
        let priced = item("free", "product", &[("price", "number", json!(0))]);
        assert!(is_exportable(&priced, &[]));
        assert_eq!(project_row(&priced, &[]), vec![Cell::Number(0.0)]);
        assert_eq!(Cell::Number(0.0).to_plain(), "0");
    }
}
