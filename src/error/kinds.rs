use std::{fmt, io};

use super::delivery::ErrorInfo;

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for content export operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ExportError {
    /// Configuration errors.
    Config(ConfigError),

    /// API key or environment identifier problems.
    Credential(CredentialError),

    /// The environment is reachable but has nothing to export from.
    Schema(SchemaError),

    /// Delivery API call failures.
    Repository(RepositoryError),

    /// Filter construction errors.
    Filter(FilterError),

    /// Missing or invalid export form selections.
    Validation(ValidationError),

    /// Workbook, CSV or archive encoding failures.
    Packaging(PackagingError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Credential errors surfaced by the pre-validation probe.
///
/// Each variant maps to distinct remediation text, so callers must not
/// collapse them into a single "invalid key" message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No API key was supplied by arguments, environment or configuration.
    MissingApiKey,

    /// No environment identifier was supplied.
    MissingEnvironmentId,

    /// The environment identifier is not a well-formed id.
    InvalidEnvironmentId(String),

    /// The key cannot read published content in secure access mode.
    SecureAccessDenied(String),

    /// The key cannot read unpublished content through the preview endpoint.
    PreviewDenied(String),

    /// The content type listing was rejected.
    TypesUnavailable(String),

    /// The language listing was rejected.
    LanguagesUnavailable(String),
}

/// Schema errors: the credentials work but the environment is not exportable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The environment defines no content types.
    NoContentTypes { environment_id: String },

    /// The environment defines no languages.
    NoLanguages { environment_id: String },
}

/// Errors returned by a single Delivery API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// HTTP 401: the key is missing or invalid.
    Unauthorized(ErrorInfo),

    /// HTTP 403: the key lacks a capability the request requires.
    Forbidden(ErrorInfo),

    /// HTTP 404: the environment or resource does not exist.
    NotFound(ErrorInfo),

    /// Any other non-success status.
    Status { status: u16, info: ErrorInfo },

    /// The request never produced a response.
    Request(String),

    /// The response body could not be decoded.
    Decode(String),
}

/// Filter construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The element type does not support filtering.
    UnsupportedElementType(String),

    /// The phrase is not a valid operator for the element type.
    UnsupportedOperator { element_type: String, phrase: String },

    /// The value does not fit the operator's arity.
    InvalidValue { phrase: String, message: String },

    /// The filter expression could not be parsed.
    Malformed(String),
}

/// Fields of the export form, in the order they are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    ContentTypes,
    Languages,
    WorkflowStep,
    FileFormat,
    MetadataFields,
    LastModified,
}

/// A single field-adjacent validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// All validation failures found in one submission, ordered by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

/// Output encoding errors.
#[derive(Debug)]
pub enum PackagingError {
    /// Excel workbook encoding failed.
    Workbook(String),

    /// CSV encoding failed.
    Csv(String),

    /// ZIP archive encoding failed.
    Archive(String),

    /// There were no worksheets to package.
    NothingToPackage,
}

impl ValidationError {
    /// The first invalid field, which the front end should focus.
    pub fn first_field(&self) -> Option<FormField> {
        self.errors.first().map(|e| e.field)
    }
}

impl RepositoryError {
    /// Delivery error details, when the server answered.
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            RepositoryError::Unauthorized(info)
            | RepositoryError::Forbidden(info)
            | RepositoryError::NotFound(info)
            | RepositoryError::Status { info, .. } => Some(info),
            RepositoryError::Request(_) | RepositoryError::Decode(_) => None,
        }
    }

    /// Human readable message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            RepositoryError::Request(msg) | RepositoryError::Decode(msg) => msg.clone(),
            other => other
                .info()
                .map(|info| info.to_string())
                .unwrap_or_default(),
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Credential(e) => write!(f, "{e}"),
            ExportError::Schema(e) => write!(f, "{e}"),
            ExportError::Repository(e) => write!(f, "Delivery API error: {e}"),
            ExportError::Filter(e) => write!(f, "Filter error: {e}"),
            ExportError::Validation(e) => write!(f, "{e}"),
            ExportError::Packaging(e) => write!(f, "Packaging error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::MissingApiKey => write!(
                f,
                "No Delivery API key supplied. Pass --api-key, set CONTENT_EXPORT_API_KEY or add delivery.api_key to the config file."
            ),
            CredentialError::MissingEnvironmentId => write!(
                f,
                "No environment ID supplied. Pass --environment-id or set CONTENT_EXPORT_ENVIRONMENT_ID."
            ),
            CredentialError::InvalidEnvironmentId(id) => write!(
                f,
                "'{id}' is not a valid environment ID. Copy it from Environment settings; it has the form xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx."
            ),
            CredentialError::SecureAccessDenied(msg) => write!(
                f,
                "The API key cannot read published content. Make sure \"Secure access\" is enabled for the key: {msg}"
            ),
            CredentialError::PreviewDenied(msg) => write!(
                f,
                "The API key cannot read unpublished content. Make sure \"Content preview\" is enabled for the key: {msg}"
            ),
            CredentialError::TypesUnavailable(msg) => {
                write!(f, "Content types could not be loaded with this API key: {msg}")
            }
            CredentialError::LanguagesUnavailable(msg) => {
                write!(f, "Languages could not be loaded with this API key: {msg}")
            }
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NoContentTypes { environment_id } => write!(
                f,
                "Environment {environment_id} has no content types. Create a content type before exporting."
            ),
            SchemaError::NoLanguages { environment_id } => {
                write!(f, "Environment {environment_id} has no languages.")
            }
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Unauthorized(info) => write!(f, "401 Unauthorized: {info}"),
            RepositoryError::Forbidden(info) => write!(f, "403 Forbidden: {info}"),
            RepositoryError::NotFound(info) => write!(f, "404 Not Found: {info}"),
            RepositoryError::Status { status, info } => write!(f, "HTTP {status}: {info}"),
            RepositoryError::Request(msg) => write!(f, "Request failed: {msg}"),
            RepositoryError::Decode(msg) => write!(f, "Unexpected response: {msg}"),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnsupportedElementType(t) => {
                write!(f, "Elements of type '{t}' cannot be filtered")
            }
            FilterError::UnsupportedOperator {
                element_type,
                phrase,
            } => write!(f, "'{phrase}' is not a valid operator for {element_type} elements"),
            FilterError::InvalidValue { phrase, message } => {
                write!(f, "Invalid value for '{phrase}': {message}")
            }
            FilterError::Malformed(msg) => write!(f, "Malformed filter: {msg}"),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::ContentTypes => "content types",
            FormField::Languages => "languages",
            FormField::WorkflowStep => "workflow step",
            FormField::FileFormat => "file format",
            FormField::MetadataFields => "item metadata",
            FormField::LastModified => "last modified",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl fmt::Display for PackagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingError::Workbook(msg) => write!(f, "Failed to write workbook: {msg}"),
            PackagingError::Csv(msg) => write!(f, "Failed to write CSV: {msg}"),
            PackagingError::Archive(msg) => write!(f, "Failed to write ZIP archive: {msg}"),
            PackagingError::NothingToPackage => write!(f, "No worksheets to package"),
        }
    }
}

impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CredentialError {}
impl std::error::Error for SchemaError {}
impl std::error::Error for RepositoryError {}
impl std::error::Error for FilterError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for PackagingError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<CredentialError> for ExportError {
    fn from(err: CredentialError) -> Self {
        ExportError::Credential(err)
    }
}

impl From<SchemaError> for ExportError {
    fn from(err: SchemaError) -> Self {
        ExportError::Schema(err)
    }
}

impl From<RepositoryError> for ExportError {
    fn from(err: RepositoryError) -> Self {
        ExportError::Repository(err)
    }
}

impl From<FilterError> for ExportError {
    fn from(err: FilterError) -> Self {
        ExportError::Filter(err)
    }
}

impl From<ValidationError> for ExportError {
    fn from(err: ValidationError) -> Self {
        ExportError::Validation(err)
    }
}

impl From<PackagingError> for ExportError {
    fn from(err: PackagingError) -> Self {
        ExportError::Packaging(err)
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else {
            RepositoryError::Request(err.to_string())
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for PackagingError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        PackagingError::Workbook(err.to_string())
    }
}

impl From<zip::result::ZipError> for PackagingError {
    fn from(err: zip::result::ZipError) -> Self {
        PackagingError::Archive(err.to_string())
    }
}

impl From<csv::Error> for PackagingError {
    fn from(err: csv::Error) -> Self {
        PackagingError::Csv(err.to_string())
    }
}

impl From<String> for ExportError {
    fn from(msg: String) -> Self {
        ExportError::Generic(msg)
    }
}

impl From<&str> for ExportError {
    fn from(msg: &str) -> Self {
        ExportError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_messages_are_distinct() {
        let secure = CredentialError::SecureAccessDenied("x".into()).to_string();
        let preview = CredentialError::PreviewDenied("x".into()).to_string();
        assert!(secure.contains("Secure access"));
        assert!(preview.contains("Content preview"));
        assert_ne!(secure, preview);
    }

    #[test]
    fn test_validation_first_field() {
        let err = ValidationError {
            errors: vec![
                FieldError {
                    field: FormField::Languages,
                    message: "Please select at least one language.".into(),
                },
                FieldError {
                    field: FormField::FileFormat,
                    message: "Please select a file format.".into(),
                },
            ],
        };
        assert_eq!(err.first_field(), Some(FormField::Languages));
        assert!(err.to_string().starts_with("languages: Please select"));
    }

    #[test]
    fn test_repository_error_message() {
        let err = RepositoryError::Forbidden(ErrorInfo {
            message: Some("Secure access is not enabled".into()),
            ..ErrorInfo::default()
        });
        assert_eq!(err.message(), "Secure access is not enabled");
        assert_eq!(
            ExportError::from(err).to_string(),
            "Delivery API error: 403 Forbidden: Secure access is not enabled"
        );
    }
}
