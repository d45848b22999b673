//! Filter operator registry
//!
//! Maps `(element type, operator phrase)` pairs to Delivery API filter
//! operations. Every filter a user submits is resolved here before it
//! reaches the repository client, so an unknown phrase never turns into a
//! query parameter.
//!
//! The phrase lists are ordered; the first entry of each list is the
//! default operator presented for that element type.

use std::fmt;

use chrono::{DateTime, NaiveDate};

use crate::error::FilterError;
use crate::model::ElementType;

/// Filter operations understood by the Delivery API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperation {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Range,
    Contains,
    Any,
    All,
}

/// Shape of the value an operation takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// One bound or value
    Single,
    /// Lower and upper bound
    Pair,
    /// One or more codenames
    List,
}

impl FilterOperation {
    /// Operation name as exposed by the registry
    pub fn name(&self) -> &'static str {
        match self {
            FilterOperation::Equals => "equalsFilter",
            FilterOperation::NotEquals => "notEqualsFilter",
            FilterOperation::LessThan => "lessThanFilter",
            FilterOperation::LessThanOrEqual => "lessThanOrEqualToFilter",
            FilterOperation::GreaterThan => "greaterThanFilter",
            FilterOperation::GreaterThanOrEqual => "greaterThanOrEqualFilter",
            FilterOperation::Range => "rangeFilter",
            FilterOperation::Contains => "containsFilter",
            FilterOperation::Any => "anyFilter",
            FilterOperation::All => "allFilter",
        }
    }

    /// Operator suffix used in query parameters, e.g. `elements.price[lt]`
    pub fn query_operator(&self) -> &'static str {
        match self {
            FilterOperation::Equals => "eq",
            FilterOperation::NotEquals => "neq",
            FilterOperation::LessThan => "lt",
            FilterOperation::LessThanOrEqual => "lte",
            FilterOperation::GreaterThan => "gt",
            FilterOperation::GreaterThanOrEqual => "gte",
            FilterOperation::Range => "range",
            FilterOperation::Contains => "contains",
            FilterOperation::Any => "any",
            FilterOperation::All => "all",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            FilterOperation::Range => Arity::Pair,
            FilterOperation::Contains | FilterOperation::Any | FilterOperation::All => Arity::List,
            _ => Arity::Single,
        }
    }
}

impl fmt::Display for FilterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type PhraseTable = &'static [(&'static str, FilterOperation)];

const EQUALITY: PhraseTable = &[
    ("equals", FilterOperation::Equals),
    ("does not equal", FilterOperation::NotEquals),
];

const NUMBER: PhraseTable = &[
    ("equals", FilterOperation::Equals),
    ("does not equal", FilterOperation::NotEquals),
    ("is less than", FilterOperation::LessThan),
    ("is less than or equal to", FilterOperation::LessThanOrEqual),
    ("is greater than", FilterOperation::GreaterThan),
    ("is greater than or equal to", FilterOperation::GreaterThanOrEqual),
    ("is in the range of", FilterOperation::Range),
];

const DATE_TIME: PhraseTable = &[
    ("equals", FilterOperation::Equals),
    ("does not equal", FilterOperation::NotEquals),
    ("is before", FilterOperation::LessThan),
    ("is before or the same as", FilterOperation::LessThanOrEqual),
    ("is after", FilterOperation::GreaterThan),
    ("is after or the same as", FilterOperation::GreaterThanOrEqual),
    ("is in the range of", FilterOperation::Range),
];

const MODULAR_CONTENT: PhraseTable = &[
    ("contains the following item", FilterOperation::Contains),
    ("contains at least one of the following items", FilterOperation::Any),
    ("contains all of the following items", FilterOperation::All),
];

const MULTIPLE_CHOICE: PhraseTable = &[
    ("contains the following option", FilterOperation::Contains),
    ("contains at least one of the following options", FilterOperation::Any),
    ("contains all of the following options", FilterOperation::All),
];

const SUBPAGES: PhraseTable = &[
    ("contains the following page", FilterOperation::Contains),
    ("contains at least one of the following pages", FilterOperation::Any),
    ("contains all of the following pages", FilterOperation::All),
];

const TAXONOMY: PhraseTable = &[
    ("contains the following term", FilterOperation::Contains),
    ("contains at least one of the following terms", FilterOperation::Any),
    ("contains all of the following terms", FilterOperation::All),
];

/// Element types that accept filters, in display order
pub const FILTERABLE_TYPES: [ElementType; 9] = [
    ElementType::ModularContent,
    ElementType::Number,
    ElementType::MultipleChoice,
    ElementType::RichText,
    ElementType::Subpages,
    ElementType::Taxonomy,
    ElementType::Text,
    ElementType::UrlSlug,
    ElementType::DateTime,
];

/// Ordered `(phrase, operation)` pairs valid for an element type.
///
/// Returns an empty slice for types that cannot be filtered.
pub fn phrases(element_type: ElementType) -> PhraseTable {
    match element_type {
        ElementType::Text | ElementType::RichText | ElementType::UrlSlug => EQUALITY,
        ElementType::Number => NUMBER,
        ElementType::DateTime => DATE_TIME,
        ElementType::ModularContent => MODULAR_CONTENT,
        ElementType::MultipleChoice => MULTIPLE_CHOICE,
        ElementType::Subpages => SUBPAGES,
        ElementType::Taxonomy => TAXONOMY,
        ElementType::Asset | ElementType::Custom => &[],
    }
}

/// Default phrase for an element type
pub fn default_phrase(element_type: ElementType) -> Option<&'static str> {
    phrases(element_type).first().map(|(phrase, _)| *phrase)
}

/// Resolve a phrase to its filter operation
pub fn operator_name(element_type: ElementType, phrase: &str) -> Result<FilterOperation, FilterError> {
    let table = phrases(element_type);
    if table.is_empty() {
        return Err(FilterError::UnsupportedElementType(element_type.to_string()));
    }

    let wanted = phrase.trim();
    table
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(wanted))
        .map(|(_, operation)| *operation)
        .ok_or_else(|| FilterError::UnsupportedOperator {
            element_type: element_type.to_string(),
            phrase: wanted.to_string(),
        })
}

/// Filter value shaped by the operation's arity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    Range(String, String),
    List(Vec<String>),
}

impl FilterValue {
    /// Split raw user text according to an operation's arity.
    ///
    /// Pairs and lists are comma separated.
    pub fn parse(operation: FilterOperation, raw: &str, phrase: &str) -> Result<Self, FilterError> {
        let invalid = |message: &str| FilterError::InvalidValue {
            phrase: phrase.to_string(),
            message: message.to_string(),
        };

        match operation.arity() {
            Arity::Single => {
                let value = raw.trim();
                if value.is_empty() {
                    return Err(invalid("a value is required"));
                }
                Ok(FilterValue::Single(value.to_string()))
            }
            Arity::Pair => {
                let bounds: Vec<&str> = raw.split(',').map(str::trim).collect();
                match bounds.as_slice() {
                    [low, high] if !low.is_empty() && !high.is_empty() => {
                        Ok(FilterValue::Range(low.to_string(), high.to_string()))
                    }
                    _ => Err(invalid("expected two bounds separated by a comma")),
                }
            }
            Arity::List => {
                let values: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                if values.is_empty() {
                    return Err(invalid("at least one codename is required"));
                }
                if operation == FilterOperation::Contains && values.len() > 1 {
                    return Err(invalid("takes exactly one codename"));
                }
                Ok(FilterValue::List(values))
            }
        }
    }

    /// Query parameter value
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Single(v) => v.clone(),
            FilterValue::Range(low, high) => format!("{low},{high}"),
            FilterValue::List(values) => values.join(","),
        }
    }

    fn bounds(&self) -> Vec<&str> {
        match self {
            FilterValue::Single(v) => vec![v.as_str()],
            FilterValue::Range(low, high) => vec![low.as_str(), high.as_str()],
            FilterValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// A validated element filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    element_type: ElementType,
    phrase: String,
    operation: FilterOperation,
    element_codename: String,
    value: FilterValue,
}

impl FilterSpec {
    /// Resolve the phrase through the registry and check the value shape
    pub fn new(
        element_type: ElementType,
        phrase: &str,
        element_codename: &str,
        value: FilterValue,
    ) -> Result<Self, FilterError> {
        let operation = operator_name(element_type, phrase)?;
        check_value(element_type, operation, phrase, &value)?;

        let codename = element_codename.trim();
        if codename.is_empty() {
            return Err(FilterError::Malformed("element codename is empty".to_string()));
        }

        Ok(Self {
            element_type,
            phrase: phrase.trim().to_string(),
            operation,
            element_codename: codename.to_string(),
            value,
        })
    }

    /// Parse `<element_type>:<element_codename>:<phrase>=<value>`
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        let malformed = || {
            FilterError::Malformed(format!(
                "'{expression}' (expected <element_type>:<element_codename>:<operator>=<value>)"
            ))
        };

        let mut parts = expression.splitn(3, ':');
        let element_type = parts.next().ok_or_else(malformed)?;
        let codename = parts.next().ok_or_else(malformed)?;
        let (phrase, raw_value) = parts
            .next()
            .and_then(|rest| rest.split_once('='))
            .ok_or_else(malformed)?;

        let element_type: ElementType = element_type
            .parse()
            .map_err(|_| FilterError::UnsupportedElementType(element_type.trim().to_string()))?;
        let operation = operator_name(element_type, phrase)?;
        let value = FilterValue::parse(operation, raw_value, phrase.trim())?;

        Self::new(element_type, phrase, codename, value)
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn operation(&self) -> FilterOperation {
        self.operation
    }

    pub fn element_codename(&self) -> &str {
        &self.element_codename
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// `(key, value)` query parameter for this filter
    pub fn query_pair(&self) -> (String, String) {
        (
            format!(
                "elements.{}[{}]",
                self.element_codename,
                self.operation.query_operator()
            ),
            self.value.to_query_value(),
        )
    }
}

/// Filter on `system.last_modified`, using the date & time phrases
#[derive(Debug, Clone, PartialEq)]
pub struct LastModifiedFilter {
    phrase: String,
    operation: FilterOperation,
    value: FilterValue,
}

impl LastModifiedFilter {
    pub fn new(phrase: &str, value: FilterValue) -> Result<Self, FilterError> {
        let operation = operator_name(ElementType::DateTime, phrase)?;
        check_value(ElementType::DateTime, operation, phrase, &value)?;
        Ok(Self {
            phrase: phrase.trim().to_string(),
            operation,
            value,
        })
    }

    /// Parse `<phrase>=<date>[,<date>]`
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        let (phrase, raw_value) = expression.split_once('=').ok_or_else(|| {
            FilterError::Malformed(format!("'{expression}' (expected <operator>=<date>[,<date>])"))
        })?;
        let operation = operator_name(ElementType::DateTime, phrase)?;
        let value = FilterValue::parse(operation, raw_value, phrase.trim())?;
        Self::new(phrase, value)
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn operation(&self) -> FilterOperation {
        self.operation
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    pub fn query_pair(&self) -> (String, String) {
        (
            format!("system.last_modified[{}]", self.operation.query_operator()),
            self.value.to_query_value(),
        )
    }
}

fn check_value(
    element_type: ElementType,
    operation: FilterOperation,
    phrase: &str,
    value: &FilterValue,
) -> Result<(), FilterError> {
    let invalid = |message: String| FilterError::InvalidValue {
        phrase: phrase.trim().to_string(),
        message,
    };

    let shape_ok = matches!(
        (operation.arity(), value),
        (Arity::Single, FilterValue::Single(_))
            | (Arity::Pair, FilterValue::Range(_, _))
            | (Arity::List, FilterValue::List(_))
    );
    if !shape_ok {
        return Err(invalid(format!("{} expects a {:?} value", operation, operation.arity())));
    }

    for bound in value.bounds() {
        match element_type {
            ElementType::Number if bound.parse::<f64>().is_err() => {
                return Err(invalid(format!("'{bound}' is not a number")));
            }
            ElementType::DateTime if !is_date(bound) => {
                return Err(invalid(format!(
                    "'{bound}' is not a date (use YYYY-MM-DD or an RFC 3339 timestamp)"
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(value).is_ok()
}
