//! Item query construction
//!
//! An [`ItemQuery`] is the per-language slice of an export request. It renders
//! to Delivery API query parameters; pagination parameters are added by the
//! client.

use crate::filter::{FilterSpec, LastModifiedFilter};
use crate::model::{ExportRequest, WorkflowStep};

/// Query for the items of one language
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub types: Vec<String>,
    pub language: String,
    pub workflow_step: WorkflowStep,
    pub last_modified: Option<LastModifiedFilter>,
    pub item_name: Option<String>,
    pub collection: Option<String>,
    pub element_filters: Vec<FilterSpec>,
}

impl ItemQuery {
    /// Slice an export request down to one language
    pub fn for_language(request: &ExportRequest, language: &str) -> Self {
        Self {
            types: request.content_types().to_vec(),
            language: language.to_string(),
            workflow_step: request.workflow_step(),
            last_modified: request.last_modified().cloned(),
            item_name: request.item_name().map(str::to_string),
            collection: request.collection().map(str::to_string),
            element_filters: request.element_filters().to_vec(),
        }
    }

    /// Whether the query must go through the preview endpoint
    pub fn uses_preview(&self) -> bool {
        self.workflow_step.uses_preview()
    }

    /// Query parameters, without pagination
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("system.type[in]".to_string(), self.types.join(",")),
            ("language".to_string(), self.language.clone()),
            ("system.language".to_string(), self.language.clone()),
            ("order".to_string(), "system.type[asc]".to_string()),
            ("depth".to_string(), "0".to_string()),
        ];

        if let Some(step) = self.workflow_step.filter_value() {
            params.push(("system.workflow_step".to_string(), step.to_string()));
        }
        if let Some(name) = &self.item_name {
            params.push(("system.name".to_string(), name.clone()));
        }
        if let Some(collection) = &self.collection {
            params.push(("system.collection".to_string(), collection.clone()));
        }
        if let Some(filter) = &self.last_modified {
            params.push(filter.query_pair());
        }
        params.extend(self.element_filters.iter().map(FilterSpec::query_pair));

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileFormat;

    fn request(step: WorkflowStep) -> ExportRequest {
        ExportRequest::builder()
            .content_types(["article", "page"])
            .languages(["en-US", "de-DE"])
            .workflow_step(Some(step))
            .file_format(Some(FileFormat::Excel))
            .collection(Some("marketing".to_string()))
            .last_modified(Some(LastModifiedFilter::parse("is before=2024-06-01").unwrap()))
            .element_filters(vec![FilterSpec::parse("number:price:is greater than=5").unwrap()])
            .build()
            .unwrap()
    }

    fn value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_published_query_params() {
        let query = ItemQuery::for_language(&request(WorkflowStep::Published), "de-DE");
        let params = query.to_params();

        assert!(!query.uses_preview());
        assert_eq!(value(&params, "system.type[in]"), Some("article,page"));
        assert_eq!(value(&params, "language"), Some("de-DE"));
        assert_eq!(value(&params, "system.language"), Some("de-DE"));
        assert_eq!(value(&params, "order"), Some("system.type[asc]"));
        assert_eq!(value(&params, "system.workflow_step"), Some("published"));
        assert_eq!(value(&params, "system.collection"), Some("marketing"));
        assert_eq!(value(&params, "system.name"), None);
        assert_eq!(value(&params, "system.last_modified[lt]"), Some("2024-06-01"));
        assert_eq!(value(&params, "elements.price[gt]"), Some("5"));
    }

    #[test]
    fn test_latest_version_has_no_workflow_filter() {
        let query = ItemQuery::for_language(&request(WorkflowStep::LatestVersion), "en-US");
        assert!(query.uses_preview());
        assert_eq!(value(&query.to_params(), "system.workflow_step"), None);
    }

    #[test]
    fn test_draft_filters_draft_step() {
        let query = ItemQuery::for_language(&request(WorkflowStep::Draft), "en-US");
        assert_eq!(value(&query.to_params(), "system.workflow_step"), Some("draft"));
    }
}
