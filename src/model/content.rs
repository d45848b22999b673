//! Content items and their element values
//!
//! Items are decoded from Delivery API JSON. The `elements` object keeps the
//! content type's declaration order (serde_json is built with
//! `preserve_order`), and every element value is decoded once into an
//! [`ElementValue`] variant so later stages pattern-match instead of
//! inspecting JSON shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Element types known to the Delivery API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Text,
    RichText,
    Number,
    DateTime,
    MultipleChoice,
    Taxonomy,
    ModularContent,
    Subpages,
    Asset,
    UrlSlug,
    #[serde(other)]
    Custom,
}

impl ElementType {
    /// All element types, in the order they are listed to users
    pub const ALL: [ElementType; 11] = [
        ElementType::Text,
        ElementType::RichText,
        ElementType::Number,
        ElementType::DateTime,
        ElementType::MultipleChoice,
        ElementType::Taxonomy,
        ElementType::ModularContent,
        ElementType::Subpages,
        ElementType::Asset,
        ElementType::UrlSlug,
        ElementType::Custom,
    ];

    /// API name of the element type
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::RichText => "rich_text",
            ElementType::Number => "number",
            ElementType::DateTime => "date_time",
            ElementType::MultipleChoice => "multiple_choice",
            ElementType::Taxonomy => "taxonomy",
            ElementType::ModularContent => "modular_content",
            ElementType::Subpages => "subpages",
            ElementType::Asset => "asset",
            ElementType::UrlSlug => "url_slug",
            ElementType::Custom => "custom",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown element type '{s}'"))
    }
}

/// A `{name, codename}` pair used by multiple choice and taxonomy values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedTerm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub codename: String,
}

/// Asset descriptor; only the fields the export uses are kept
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Decoded element value, one variant per element type
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Text(String),
    RichText(String),
    Number(Option<f64>),
    DateTime(Option<String>),
    UrlSlug(String),
    MultipleChoice(Vec<NamedTerm>),
    Taxonomy(Vec<NamedTerm>),
    /// Codenames of linked items
    ModularContent(Vec<String>),
    /// Codenames of subpage items
    Subpages(Vec<String>),
    Asset(Vec<AssetRef>),
    /// Raw custom element value, kept only for the content check
    Custom(Option<String>),
}

impl ElementValue {
    /// Decode a raw JSON value for an element of the given type
    pub fn decode(element_type: ElementType, value: Value) -> Result<Self, String> {
        let decoded = match element_type {
            ElementType::Text => ElementValue::Text(decode_string(value)?),
            ElementType::RichText => ElementValue::RichText(decode_string(value)?),
            ElementType::UrlSlug => ElementValue::UrlSlug(decode_string(value)?),
            ElementType::Number => match value {
                Value::Null => ElementValue::Number(None),
                Value::Number(n) => ElementValue::Number(n.as_f64()),
                other => return Err(format!("expected a number, found {other}")),
            },
            ElementType::DateTime => match value {
                Value::Null => ElementValue::DateTime(None),
                Value::String(s) => ElementValue::DateTime(Some(s)),
                other => return Err(format!("expected a date string, found {other}")),
            },
            ElementType::MultipleChoice => ElementValue::MultipleChoice(decode_list(value)?),
            ElementType::Taxonomy => ElementValue::Taxonomy(decode_list(value)?),
            ElementType::ModularContent => ElementValue::ModularContent(decode_codenames(value)?),
            ElementType::Subpages => ElementValue::Subpages(decode_codenames(value)?),
            ElementType::Asset => ElementValue::Asset(decode_list(value)?),
            ElementType::Custom => ElementValue::Custom(match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            }),
        };
        Ok(decoded)
    }

    /// Element type this value belongs to
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementValue::Text(_) => ElementType::Text,
            ElementValue::RichText(_) => ElementType::RichText,
            ElementValue::Number(_) => ElementType::Number,
            ElementValue::DateTime(_) => ElementType::DateTime,
            ElementValue::UrlSlug(_) => ElementType::UrlSlug,
            ElementValue::MultipleChoice(_) => ElementType::MultipleChoice,
            ElementValue::Taxonomy(_) => ElementType::Taxonomy,
            ElementValue::ModularContent(_) => ElementType::ModularContent,
            ElementValue::Subpages(_) => ElementType::Subpages,
            ElementValue::Asset(_) => ElementType::Asset,
            ElementValue::Custom(_) => ElementType::Custom,
        }
    }

    /// Whether the raw value carries content.
    ///
    /// Only an empty string or an empty list is empty. Numbers and dates
    /// count unless they are `""`, so `0` and an unset number both count.
    /// String-valued elements (including custom ones) decode `null` as `""`.
    pub fn is_present(&self) -> bool {
        match self {
            ElementValue::Text(s) | ElementValue::RichText(s) | ElementValue::UrlSlug(s) => {
                !s.is_empty()
            }
            ElementValue::Number(_) => true,
            ElementValue::DateTime(d) => d.as_deref().is_none_or(|d| !d.is_empty()),
            ElementValue::MultipleChoice(terms) | ElementValue::Taxonomy(terms) => {
                !terms.is_empty()
            }
            ElementValue::ModularContent(codenames) | ElementValue::Subpages(codenames) => {
                !codenames.is_empty()
            }
            ElementValue::Asset(assets) => !assets.is_empty(),
            ElementValue::Custom(raw) => raw.as_deref().is_some_and(|r| !r.is_empty()),
        }
    }
}

fn decode_string(value: Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        other => Err(format!("expected a string, found {other}")),
    }
}

fn decode_list<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(|e| e.to_string()),
    }
}

/// Linked item lists are plain codenames; tolerate `{codename}` objects too.
fn decode_codenames(value: Value) -> Result<Vec<String>, String> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => return Err(format!("expected a list of codenames, found {other}")),
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(s) => Ok(s),
            Value::Object(map) => map
                .get("codename")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| "reference without a codename".to_string()),
            other => Err(format!("unexpected reference {other}")),
        })
        .collect()
}

/// One named, typed field of a content item
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub codename: String,
    pub name: String,
    pub value: ElementValue,
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        self.value.element_type()
    }
}

/// System attributes of a content item
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemAttributes {
    pub id: String,
    pub name: String,
    pub codename: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub language: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub workflow_step: Option<String>,
}

/// A content item: system attributes plus elements in declaration order
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawContentItem")]
pub struct ContentItem {
    pub system: SystemAttributes,
    pub elements: Vec<Element>,
}

impl ContentItem {
    /// Codename of the item's content type
    pub fn content_type(&self) -> &str {
        &self.system.content_type
    }

    /// True iff at least one element value is non-empty
    pub fn has_content(&self) -> bool {
        self.elements.iter().any(|e| e.value.is_present())
    }
}

#[derive(Deserialize)]
struct RawContentItem {
    system: SystemAttributes,
    #[serde(default)]
    elements: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    element_type: ElementType,
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Value,
}

impl TryFrom<RawContentItem> for ContentItem {
    type Error = String;

    fn try_from(raw: RawContentItem) -> Result<Self, Self::Error> {
        let mut elements = Vec::with_capacity(raw.elements.len());

        for (codename, raw_element) in raw.elements {
            let element: RawElement = serde_json::from_value(raw_element)
                .map_err(|e| format!("element '{codename}' of '{}': {e}", raw.system.codename))?;
            let value = ElementValue::decode(element.element_type, element.value)
                .map_err(|e| format!("element '{codename}' of '{}': {e}", raw.system.codename))?;
            elements.push(Element {
                codename,
                name: element.name,
                value,
            });
        }

        Ok(ContentItem {
            system: raw.system,
            elements,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    use super::ContentItem;

    /// Build an item of `content_type` from `(codename, type, value)` triples
    pub fn item(codename: &str, content_type: &str, elements: &[(&str, &str, Value)]) -> ContentItem {
        let mut map = serde_json::Map::new();
        for (element, element_type, value) in elements {
            map.insert(
                element.to_string(),
                json!({ "type": element_type, "name": element, "value": value }),
            );
        }
        serde_json::from_value(json!({
            "system": {
                "id": format!("id-{codename}"),
                "name": codename.replace('_', " "),
                "codename": codename,
                "type": content_type,
                "language": "en-US",
                "collection": "default",
                "last_modified": "2024-05-01T10:00:00Z",
                "workflow": "default",
                "workflow_step": "published"
            },
            "elements": Value::Object(map)
        }))
        .expect("fixture item")
    }
}
