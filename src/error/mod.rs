//! Error handling module for content export operations.
//!
//! This module provides the error taxonomy used across the export pipeline:
//! - Credential and schema errors raised by the pre-validation probe
//! - Repository errors raised by individual Delivery API calls
//! - Filter and form validation errors raised at the input boundary
//! - Packaging errors raised while encoding workbooks and archives
//!
//! Delivery API error bodies are parsed into [`ErrorInfo`] so that the
//! message, request id and error codes reach the user intact.
//!
//! # Example
//!
//! ```rust
//! use content_export::error::{CredentialError, ExportError, Result};
//!
//! fn check_key(key: &str) -> Result<()> {
//!     if key.is_empty() {
//!         return Err(CredentialError::MissingApiKey.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check_key(""), Err(ExportError::Credential(_))));
//! ```

pub mod delivery;
pub mod kinds;

// Re-export commonly used types
pub use delivery::ErrorInfo;
pub use kinds::{
    ConfigError, CredentialError, ExportError, FieldError, FilterError, FormField,
    PackagingError, RepositoryError, Result, SchemaError, ValidationError,
};
