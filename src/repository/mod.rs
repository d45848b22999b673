//! Content repository client
//!
//! The export pipeline talks to the CMS only through the
//! [`ContentRepository`] trait. [`DeliveryClient`] implements it over the
//! Delivery REST API; tests substitute an in-memory repository.
//!
//! Every method returns a typed [`RepositoryError`] instead of aborting, so
//! the orchestrator can decide whether a failure ends the whole run or only
//! one language.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RepositoryError;
use crate::model::{ContentItem, ElementType};

pub mod delivery;
pub mod probe;
pub mod query;

pub use delivery::DeliveryClient;
pub use probe::{Credentials, ProbeReport, probe};
pub use query::ItemQuery;

/// Items matching one query, ordered ascending by content type codename
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedItems {
    pub items: Vec<ContentItem>,
    /// Total matches reported by the API
    pub total_count: u64,
}

/// Content type as listed by the types endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContentType")]
pub struct ContentTypeSchema {
    pub id: String,
    pub codename: String,
    pub name: String,
    /// `(codename, type)` pairs in declaration order
    pub elements: Vec<(String, ElementType)>,
}

/// Language as listed by the languages endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLanguage")]
pub struct LanguageDescriptor {
    pub id: String,
    pub codename: String,
    pub name: String,
}

/// Read access to a content environment
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Environment identifier this repository reads from
    fn environment_id(&self) -> &str;

    /// Fetch every item matching the query, following pagination
    async fn fetch_items(&self, query: &ItemQuery) -> Result<FetchedItems, RepositoryError>;

    /// List content types
    async fn fetch_types(&self) -> Result<Vec<ContentTypeSchema>, RepositoryError>;

    /// List languages
    async fn fetch_languages(&self) -> Result<Vec<LanguageDescriptor>, RepositoryError>;

    /// Read one published item in secure access mode
    async fn secure_access_test(&self) -> Result<(), RepositoryError>;

    /// Read one item through the preview endpoint
    async fn preview_test(&self) -> Result<(), RepositoryError>;
}

/// Restore ascending content type order if a page arrived out of order.
///
/// The sort is stable, so items keep their relative order within a type.
/// Returns true when the input had to be reordered.
pub fn ensure_type_order(items: &mut [ContentItem]) -> bool {
    let ordered = items
        .windows(2)
        .all(|pair| pair[0].content_type() <= pair[1].content_type());
    if ordered {
        return false;
    }

    warn!("Items were not ordered by content type; reordering before grouping");
    items.sort_by(|a, b| a.content_type().cmp(b.content_type()));
    true
}

#[derive(Deserialize)]
struct RawTypeSystem {
    #[serde(default)]
    id: String,
    codename: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct RawTypeElement {
    #[serde(rename = "type")]
    element_type: ElementType,
}

#[derive(Deserialize)]
struct RawContentType {
    system: RawTypeSystem,
    #[serde(default)]
    elements: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawContentType> for ContentTypeSchema {
    type Error = String;

    fn try_from(raw: RawContentType) -> Result<Self, Self::Error> {
        let elements = raw
            .elements
            .into_iter()
            .map(|(codename, value)| {
                serde_json::from_value::<RawTypeElement>(value)
                    .map(|e| (codename.clone(), e.element_type))
                    .map_err(|e| format!("element '{codename}' of type '{}': {e}", raw.system.codename))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContentTypeSchema {
            id: raw.system.id,
            codename: raw.system.codename,
            name: raw.system.name,
            elements,
        })
    }
}

#[derive(Deserialize)]
struct RawLanguage {
    system: RawTypeSystem,
}

impl From<RawLanguage> for LanguageDescriptor {
    fn from(raw: RawLanguage) -> Self {
        LanguageDescriptor {
            id: raw.system.id,
            codename: raw.system.codename,
            name: raw.system.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::fixtures::item;
    use serde_json::json;

    #[test]
    fn test_ordered_items_untouched() {
        let mut items = vec![
            item("a1", "article", &[]),
            item("a2", "article", &[]),
            item("p1", "page", &[]),
        ];
        assert!(!ensure_type_order(&mut items));
        assert_eq!(items[2].system.codename, "p1");
    }

    #[test]
    fn test_unordered_items_are_stably_sorted() {
        let mut items = vec![
            item("p1", "page", &[]),
            item("a1", "article", &[]),
            item("p2", "page", &[]),
            item("a2", "article", &[]),
        ];
        assert!(ensure_type_order(&mut items));
        let codenames: Vec<&str> = items.iter().map(|i| i.system.codename.as_str()).collect();
        assert_eq!(codenames, vec!["a1", "a2", "p1", "p2"]);
    }

    #[test]
    fn test_decode_content_type() {
        let schema: ContentTypeSchema = serde_json::from_value(json!({
            "system": { "id": "t1", "name": "Article", "codename": "article" },
            "elements": {
                "title": { "type": "text", "name": "Title" },
                "tags": { "type": "taxonomy", "name": "Tags", "taxonomy_group": "tags" }
            }
        }))
        .unwrap();
        assert_eq!(schema.codename, "article");
        assert_eq!(
            schema.elements,
            vec![
                ("title".to_string(), ElementType::Text),
                ("tags".to_string(), ElementType::Taxonomy)
            ]
        );
    }

    #[test]
    fn test_decode_language() {
        let language: LanguageDescriptor = serde_json::from_value(json!({
            "system": { "id": "l1", "name": "Español (Spain)", "codename": "es-ES" }
        }))
        .unwrap();
        assert_eq!(language.codename, "es-ES");
        assert_eq!(language.name, "Español (Spain)");
    }
}
