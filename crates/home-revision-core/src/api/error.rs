use thiserror::Error;

use crate::auth::CredentialError;
use crate::models::ValidationError;
use crate::notify::Notice;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 from the token endpoint, with the server's `detail` if it sent one
    #[error("{}", .detail.as_deref().unwrap_or("Unknown authorization error"))]
    Unauthorized { detail: Option<String> },

    /// 400 from the registration endpoint, with the first server error if any
    #[error("{}", .reason.as_deref().unwrap_or("Registration error"))]
    Rejected { reason: Option<String> },

    #[error("Authorization token not found")]
    MissingToken,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No changes to save")]
    NoChanges,

    #[error("Product {0} is not in the current list")]
    UnknownProduct(i64),

    #[error("{action}. Status: {status}")]
    Server { action: &'static str, status: u16 },

    #[error("Invalid server response")]
    InvalidResponse,

    #[error("Failed to parse server data: {0}")]
    Parse(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Maximum length for response bodies written to the log
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// User-facing rendering of this error
    pub fn notice(&self) -> Notice {
        match self {
            // The server explained itself; no need to buzz
            ApiError::Unauthorized { detail: Some(_) } => Notice::error(self.to_string(), false),
            ApiError::Validation(_) | ApiError::NoChanges => {
                Notice::error(self.to_string(), false)
            }
            _ => Notice::error(self.to_string(), true),
        }
    }

    /// Status code for errors that came back from the server
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Rejected { .. } => Some(400),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeKind;

    #[test]
    fn test_unauthorized_message_uses_detail_verbatim() {
        let err = ApiError::Unauthorized {
            detail: Some("No active account found with the given credentials".to_string()),
        };
        let notice = err.notice();
        assert_eq!(notice.message, "No active account found with the given credentials");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(!notice.vibrate);

        let generic = ApiError::Unauthorized { detail: None }.notice();
        assert_eq!(generic.message, "Unknown authorization error");
        assert!(generic.vibrate);
    }

    #[test]
    fn test_server_error_embeds_status() {
        let err = ApiError::Server {
            action: "Failed to add product",
            status: 500,
        };
        assert_eq!(err.to_string(), "Failed to add product. Status: 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_rejected_registration_messages() {
        let err = ApiError::Rejected {
            reason: Some("Phone number already registered".to_string()),
        };
        assert_eq!(err.to_string(), "Phone number already registered");
        assert_eq!(ApiError::Rejected { reason: None }.to_string(), "Registration error");
    }

    #[test]
    fn test_validation_passes_field_message_through() {
        let err = ApiError::from(ValidationError::InvalidQuantity);
        assert_eq!(err.to_string(), "Quantity must be a non-negative number.");
        assert!(!err.notice().vibrate);
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let short = "tiny";
        assert_eq!(ApiError::truncate_body(short), "tiny");

        let long = "я".repeat(400); // 800 bytes
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
