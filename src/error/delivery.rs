use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured error body returned by the Delivery API.
///
/// Every non-success response carries a JSON document with a human readable
/// message and a request id that support can trace.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_code: Option<i64>,
}

impl ErrorInfo {
    /// Parse an error body, falling back to the raw text when it is not JSON.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ErrorInfo>(body) {
            Ok(info) if info.message.is_some() => info,
            _ => {
                let trimmed = body.trim();
                ErrorInfo {
                    message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    ..ErrorInfo::default()
                }
            }
        }
    }

    /// Message text, or a generic placeholder for empty bodies.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("no error message returned")
    }

    /// Convert error info to compact JSON string (single line).
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message_or_default())?;
        if let Some(code) = self.error_code {
            write!(f, " (error code {code})")?;
        }
        if let Some(request_id) = &self.request_id {
            if !request_id.is_empty() {
                write!(f, " [request {request_id}]")?;
            }
        }
        Ok(())
    }
}
