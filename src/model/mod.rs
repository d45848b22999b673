//! Domain model for content export
//!
//! This module defines the values that flow through the export pipeline:
//! - `content`: content items as returned by the Delivery API, with element
//!   values decoded into a closed tagged union
//! - `request`: the immutable export request assembled from user input

pub mod content;
pub mod request;

pub use content::{AssetRef, ContentItem, Element, ElementType, ElementValue, NamedTerm, SystemAttributes};
pub use request::{ExportRequest, ExportRequestBuilder, FileFormat, MetadataField, WorkflowStep};
