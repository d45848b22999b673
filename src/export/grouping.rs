//! Worksheet assembly
//!
//! Items arrive ordered by content type. Each contiguous run of one type
//! becomes one [`WorksheetGroup`]. The header is taken from the last item
//! pushed into the run, so runs whose items disagree on their element set are
//! reported as divergent rather than reconciled.

use tracing::{debug, warn};

use crate::model::{ContentItem, MetadataField};

use super::projection::{ExportRow, header_for, is_exportable, project_row};

/// One worksheet: all exported rows of one content type in one language
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetGroup {
    pub language: String,
    pub content_type: String,
    /// Requested sheet name; writers make it unique and valid
    pub sheet_name: String,
    pub header: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// Worksheets of one language plus the counters the run report needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub groups: Vec<WorksheetGroup>,
    pub items_found: u64,
    pub items_exported: u64,
    /// Content types whose runs mixed element shapes
    pub divergent_types: Vec<String>,
}

/// Group an ordered item list into worksheets
///
/// # Arguments
/// * `language` - Language codename the items were fetched for
/// * `items` - Items ordered ascending by content type
/// * `metadata` - Selected metadata columns
///
/// # Returns
/// * `Assembly` - Non-empty worksheets in order of first appearance
pub fn assemble(language: &str, items: &[ContentItem], metadata: &[MetadataField]) -> Assembly {
    let mut assembly = Assembly {
        items_found: items.len() as u64,
        ..Assembly::default()
    };

    for run in items.chunk_by(|a, b| a.content_type() == b.content_type()) {
        let content_type = run[0].content_type();
        let pushed: Vec<&ContentItem> = run
            .iter()
            .filter(|item| is_exportable(item, metadata))
            .collect();

        let Some(last) = pushed.last() else {
            debug!(
                "Skipping {} in {}: {} item(s) without content",
                content_type,
                language,
                run.len()
            );
            continue;
        };

        let header = header_for(last, metadata);
        if pushed.iter().any(|item| header_for(item, metadata) != header) {
            warn!(
                "Items of {} in {} have different element sets; using the last item's columns",
                content_type, language
            );
            assembly.divergent_types.push(content_type.to_string());
        }

        let rows: Vec<ExportRow> = pushed.iter().map(|item| project_row(item, metadata)).collect();
        assembly.items_exported += rows.len() as u64;

        debug!("Worksheet {} / {}: {} row(s)", language, content_type, rows.len());
        assembly.groups.push(WorksheetGroup {
            language: language.to_string(),
            content_type: content_type.to_string(),
            sheet_name: content_type.to_string(),
            header,
            rows,
        });
    }

    assembly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::projection::Cell;
    use crate::model::content::fixtures::item;
    use serde_json::json;

    fn text(codename: &str, content_type: &str, title: &str) -> ContentItem {
        item(codename, content_type, &[("title", "text", json!(title))])
    }

    #[test]
    fn test_empty_input_has_no_groups() {
        let assembly = assemble("en-US", &[], &[]);
        assert!(assembly.groups.is_empty());
        assert_eq!(assembly.items_found, 0);
    }

    #[test]
    fn test_one_group_per_type_in_order() {
        let items = vec![
            text("a1", "article", "A1"),
            text("a2", "article", "A2"),
            text("h1", "hero", "H1"),
            text("p1", "page", "P1"),
            text("p2", "page", "P2"),
        ];
        let assembly = assemble("en-US", &items, &[]);

        let types: Vec<&str> = assembly.groups.iter().map(|g| g.content_type.as_str()).collect();
        assert_eq!(types, vec!["article", "hero", "page"]);

        let rows: Vec<&ExportRow> = assembly.groups.iter().flat_map(|g| g.rows.iter()).collect();
        let titles: Vec<String> = rows.iter().map(|r| r[0].to_plain()).collect();
        assert_eq!(titles, vec!["A1", "A2", "H1", "P1", "P2"]);
        assert_eq!(assembly.items_exported, 5);
        assert!(assembly.divergent_types.is_empty());
    }

    #[test]
    fn test_empty_item_is_dropped_and_header_follows_last_pushed() {
        let items = vec![
            item(
                "first",
                "article",
                &[("title", "text", json!("First")), ("summary", "text", json!("S"))],
            ),
            item(
                "second",
                "article",
                &[("title", "text", json!("Second")), ("author", "text", json!("Jo"))],
            ),
            item(
                "blank",
                "article",
                &[("title", "text", json!("")), ("body", "rich_text", json!(""))],
            ),
        ];
        let assembly = assemble("en-US", &items, &[]);

        assert_eq!(assembly.groups.len(), 1);
        let group = &assembly.groups[0];
        assert_eq!(group.rows.len(), 2);
        assert_eq!(group.header, vec!["title", "author"]);
        assert_eq!(assembly.items_found, 3);
        assert_eq!(assembly.items_exported, 2);
        assert_eq!(assembly.divergent_types, vec!["article"]);
    }

    #[test]
    fn test_run_of_empty_items_produces_no_group() {
        let items = vec![
            text("a1", "article", "A1"),
            item("e1", "event", &[("title", "text", json!(""))]),
            item("e2", "event", &[("tags", "taxonomy", json!([]))]),
        ];
        let assembly = assemble("de-DE", &items, &[]);

        assert_eq!(assembly.groups.len(), 1);
        assert_eq!(assembly.groups[0].content_type, "article");
        assert_eq!(assembly.groups[0].language, "de-DE");
        assert_eq!(assembly.items_exported, 1);
    }

    #[test]
    fn test_metadata_keeps_empty_items() {
        let items = vec![item("e1", "event", &[("title", "text", json!(""))])];
        let assembly = assemble("en-US", &items, &[MetadataField::Codename]);

        assert_eq!(assembly.groups[0].header, vec!["codename", "title"]);
        assert_eq!(
            assembly.groups[0].rows[0],
            vec![Cell::Text("e1".into()), Cell::Empty]
        );
        assert_eq!(assembly.items_exported, 1);
    }

    #[test]
    fn test_single_item_run_uses_its_own_keys() {
        let items = vec![item(
            "solo",
            "landing",
            &[("headline", "text", json!("Hi")), ("cta", "url_slug", json!("go"))],
        )];
        let assembly = assemble("en-US", &items, &[]);
        assert_eq!(assembly.groups[0].header, vec!["headline", "cta"]);
        assert_eq!(assembly.groups[0].sheet_name, "landing");
    }
}
