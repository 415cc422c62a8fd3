//! Response payload returned to the invoker.

use serde::{Deserialize, Serialize};

/// Message carried by every successful response.
pub const SUCCESS_MESSAGE: &str = "PDF processed successfully";

/// The two response shapes, discriminated by `code`.
///
/// ```text
/// { "code": "Success", "message": "PDF processed successfully", "presigned_url": "…" }
/// { "code": "Error",   "message": "…" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum InvocationResponse {
    Success {
        message: String,
        presigned_url: String,
    },
    Error {
        message: String,
    },
}

impl InvocationResponse {
    pub fn success(presigned_url: impl Into<String>) -> Self {
        Self::Success {
            message: SUCCESS_MESSAGE.to_string(),
            presigned_url: presigned_url.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Error { message } => message,
        }
    }

    pub fn presigned_url(&self) -> Option<&str> {
        match self {
            Self::Success { presigned_url, .. } => Some(presigned_url),
            Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_wire_shape() {
        let value = serde_json::to_value(InvocationResponse::success("https://x/y?sig=1")).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "Success",
                "message": "PDF processed successfully",
                "presigned_url": "https://x/y?sig=1"
            })
        );
    }

    #[test]
    fn error_wire_shape_has_no_url() {
        let value = serde_json::to_value(InvocationResponse::error("PDF URL is required")).unwrap();
        assert_eq!(value, json!({"code": "Error", "message": "PDF URL is required"}));
    }

    #[test]
    fn accessors() {
        let ok = InvocationResponse::success("u");
        assert!(ok.is_success());
        assert_eq!(ok.presigned_url(), Some("u"));
        let err = InvocationResponse::error("boom");
        assert!(!err.is_success());
        assert_eq!(err.message(), "boom");
        assert_eq!(err.presigned_url(), None);
    }
}
