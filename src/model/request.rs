//! Export request value object
//!
//! The front end collects selections into an [`ExportRequestBuilder`] and
//! calls [`ExportRequestBuilder::build`] once on submit. The resulting
//! [`ExportRequest`] is immutable and is passed by value into the pipeline;
//! nothing downstream reads user input again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FormField, ValidationError};
use crate::filter::{FilterSpec, LastModifiedFilter};

use super::content::SystemAttributes;

/// Workflow step selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    /// Published content, read through secure access
    Published,
    /// Content in a draft step, read through preview
    Draft,
    /// Latest version regardless of step, read through preview
    LatestVersion,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Published => "published",
            WorkflowStep::Draft => "draft",
            WorkflowStep::LatestVersion => "latest-version",
        }
    }

    /// Whether the step is served by the preview endpoint
    pub fn uses_preview(&self) -> bool {
        !matches!(self, WorkflowStep::Published)
    }

    /// Value for the `system.workflow_step` filter, if the step applies one
    pub fn filter_value(&self) -> Option<&'static str> {
        match self {
            WorkflowStep::Published => Some("published"),
            WorkflowStep::Draft => Some("draft"),
            WorkflowStep::LatestVersion => None,
        }
    }
}

impl FromStr for WorkflowStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "published" => Ok(WorkflowStep::Published),
            "draft" => Ok(WorkflowStep::Draft),
            "latest-version" | "latest" | "any" => Ok(WorkflowStep::LatestVersion),
            other => Err(format!(
                "unknown workflow step '{other}' (expected published, draft or latest-version)"
            )),
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// One `.xlsx` workbook per language
    Excel,
    /// One `.csv` file per worksheet group, always zipped
    Csv,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Excel => "excel",
            FileFormat::Csv => "csv",
        }
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(FileFormat::Excel),
            "csv" => Ok(FileFormat::Csv),
            other => Err(format!("unknown file format '{other}' (expected excel or csv)")),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item metadata that can be exported as leading columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Id,
    Name,
    Codename,
    Collection,
    Language,
    Type,
    LastModified,
    Workflow,
    WorkflowStep,
}

impl MetadataField {
    pub const ALL: [MetadataField; 9] = [
        MetadataField::Id,
        MetadataField::Name,
        MetadataField::Codename,
        MetadataField::Collection,
        MetadataField::Language,
        MetadataField::Type,
        MetadataField::LastModified,
        MetadataField::Workflow,
        MetadataField::WorkflowStep,
    ];

    /// Column header for the field
    pub fn header(&self) -> &'static str {
        match self {
            MetadataField::Id => "id",
            MetadataField::Name => "name",
            MetadataField::Codename => "codename",
            MetadataField::Collection => "collection",
            MetadataField::Language => "language",
            MetadataField::Type => "type",
            MetadataField::LastModified => "last_modified",
            MetadataField::Workflow => "workflow",
            MetadataField::WorkflowStep => "workflow_step",
        }
    }

    /// Read the field from an item's system attributes
    pub fn extract(&self, system: &SystemAttributes) -> String {
        match self {
            MetadataField::Id => system.id.clone(),
            MetadataField::Name => system.name.clone(),
            MetadataField::Codename => system.codename.clone(),
            MetadataField::Collection => system.collection.clone(),
            MetadataField::Language => system.language.clone(),
            MetadataField::Type => system.content_type.clone(),
            MetadataField::LastModified => system.last_modified.clone(),
            MetadataField::Workflow => system.workflow.clone().unwrap_or_default(),
            MetadataField::WorkflowStep => system.workflow_step.clone().unwrap_or_default(),
        }
    }
}

impl FromStr for MetadataField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        MetadataField::ALL
            .iter()
            .copied()
            .find(|f| f.header() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = MetadataField::ALL.iter().map(|f| f.header()).collect();
                format!("unknown metadata field '{s}' (expected one of {})", known.join(", "))
            })
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A validated export submission
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    content_types: Vec<String>,
    languages: Vec<String>,
    workflow_step: WorkflowStep,
    file_format: FileFormat,
    item_name: Option<String>,
    collection: Option<String>,
    last_modified: Option<LastModifiedFilter>,
    element_filters: Vec<FilterSpec>,
    metadata_fields: Vec<MetadataField>,
}

impl ExportRequest {
    pub fn builder() -> ExportRequestBuilder {
        ExportRequestBuilder::default()
    }

    pub fn content_types(&self) -> &[String] {
        &self.content_types
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn workflow_step(&self) -> WorkflowStep {
        self.workflow_step
    }

    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn last_modified(&self) -> Option<&LastModifiedFilter> {
        self.last_modified.as_ref()
    }

    pub fn element_filters(&self) -> &[FilterSpec] {
        &self.element_filters
    }

    /// Metadata columns in the order the user selected them
    pub fn metadata_fields(&self) -> &[MetadataField] {
        &self.metadata_fields
    }
}

/// Collects form selections; [`build`](Self::build) validates them all at once
#[derive(Debug, Clone, Default)]
pub struct ExportRequestBuilder {
    content_types: Vec<String>,
    languages: Vec<String>,
    workflow_step: Option<WorkflowStep>,
    file_format: Option<FileFormat>,
    item_name: Option<String>,
    collection: Option<String>,
    last_modified: Option<LastModifiedFilter>,
    element_filters: Vec<FilterSpec>,
    metadata_fields: Vec<MetadataField>,
}

impl ExportRequestBuilder {
    pub fn content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn workflow_step(mut self, step: Option<WorkflowStep>) -> Self {
        self.workflow_step = step;
        self
    }

    pub fn file_format(mut self, format: Option<FileFormat>) -> Self {
        self.file_format = format;
        self
    }

    pub fn item_name(mut self, name: Option<String>) -> Self {
        self.item_name = name;
        self
    }

    pub fn collection(mut self, collection: Option<String>) -> Self {
        self.collection = collection;
        self
    }

    pub fn last_modified(mut self, filter: Option<LastModifiedFilter>) -> Self {
        self.last_modified = filter;
        self
    }

    pub fn element_filters(mut self, filters: Vec<FilterSpec>) -> Self {
        self.element_filters = filters;
        self
    }

    pub fn metadata_fields(mut self, fields: Vec<MetadataField>) -> Self {
        self.metadata_fields = fields;
        self
    }

    /// Validate the selections and freeze them into an [`ExportRequest`].
    ///
    /// Every missing selection is reported, ordered by form position, so the
    /// front end can mark all fields and focus the first one.
    pub fn build(self) -> Result<ExportRequest, ValidationError> {
        let content_types = dedupe(normalize(self.content_types));
        let languages = dedupe(normalize(self.languages));
        let mut errors = Vec::new();

        if content_types.is_empty() {
            errors.push(FieldError {
                field: FormField::ContentTypes,
                message: "Please select at least one content type to export.".to_string(),
            });
        }
        if languages.is_empty() {
            errors.push(FieldError {
                field: FormField::Languages,
                message: "Please select at least one language to export.".to_string(),
            });
        }
        if self.workflow_step.is_none() {
            errors.push(FieldError {
                field: FormField::WorkflowStep,
                message: "Please select a workflow step.".to_string(),
            });
        }
        if self.file_format.is_none() {
            errors.push(FieldError {
                field: FormField::FileFormat,
                message: "Please select a file type.".to_string(),
            });
        }

        match (self.workflow_step, self.file_format, errors.is_empty()) {
            (Some(workflow_step), Some(file_format), true) => Ok(ExportRequest {
                content_types,
                languages,
                workflow_step,
                file_format,
                item_name: non_blank(self.item_name),
                collection: non_blank(self.collection),
                last_modified: self.last_modified,
                element_filters: self.element_filters,
                metadata_fields: dedupe(self.metadata_fields),
            }),
            _ => Err(ValidationError { errors }),
        }
    }
}

fn normalize(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn dedupe<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_valid_request() {
        let request = ExportRequest::builder()
            .content_types(["article", "article", " page "])
            .languages(["en-US"])
            .workflow_step(Some(WorkflowStep::Published))
            .file_format(Some(FileFormat::Excel))
            .item_name(Some("  ".to_string()))
            .metadata_fields(vec![MetadataField::Name, MetadataField::Id, MetadataField::Name])
            .build()
            .unwrap();

        assert_eq!(request.content_types(), ["article", "page"]);
        assert_eq!(request.item_name(), None);
        assert_eq!(
            request.metadata_fields(),
            [MetadataField::Name, MetadataField::Id]
        );
    }

    #[test]
    fn test_missing_selections_reported_in_form_order() {
        let err = ExportRequest::builder()
            .languages(["en-US"])
            .build()
            .unwrap_err();

        let fields: Vec<FormField> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![FormField::ContentTypes, FormField::WorkflowStep, FormField::FileFormat]
        );
        assert_eq!(err.first_field(), Some(FormField::ContentTypes));
    }

    #[test]
    fn test_workflow_step_parsing() {
        assert_eq!("any".parse::<WorkflowStep>().unwrap(), WorkflowStep::LatestVersion);
        assert_eq!(WorkflowStep::Draft.filter_value(), Some("draft"));
        assert_eq!(WorkflowStep::LatestVersion.filter_value(), None);
        assert!(!WorkflowStep::Published.uses_preview());
        assert!("archived".parse::<WorkflowStep>().is_err());
    }

    #[test]
    fn test_metadata_field_parsing() {
        assert_eq!(
            "last-modified".parse::<MetadataField>().unwrap(),
            MetadataField::LastModified
        );
        assert!("owner".parse::<MetadataField>().is_err());
    }
}
