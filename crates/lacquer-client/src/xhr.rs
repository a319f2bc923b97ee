//! XHR error-message resolution.
//!
//! Turns an opaque HTTP error response into a single human-readable string,
//! preferring structured information over generic status text. The response
//! shape is decided once at the boundary into a [`FailureKind`]; resolution
//! never fails.

use serde::Deserialize;

/// Message shown when the server could not be reached at all.
pub const CONNECTION_REFUSED: &str =
    "Connection refused; either the server is unreachable or your internet connection is down.";

/// Message shown for HTTP 451 responses.
pub const SUBSCRIPTION_RESTRICTED: &str =
    "Your subscription does not cover usage of this service.";

/// Nested error detail carried in a structured error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
}

/// Structured JSON body of an error response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "_error")]
    pub error: Option<ErrorDetail>,

    #[serde(rename = "_message")]
    pub message: Option<String>,
}

/// An error response as received from the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct XhrErrorResponse {
    /// HTTP status code; zero when the request never completed
    pub status: u16,

    /// XHR ready state; zero when no connection was made
    pub ready_state: u16,

    /// Plain status text, the fallback of last resort
    pub status_text: String,

    /// Parsed JSON body, when the response carried one
    pub body: Option<ErrorBody>,
}

/// Classification of an error response, in resolution priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Zero status or ready state: the server was never reached
    NetworkUnreachable,

    /// HTTP 451: the service is not covered by the subscription
    SubscriptionRestricted,

    /// Structured body with a nested `_error.message`
    DetailMessage(String),

    /// Structured body with a top-level `_message`
    BodyMessage(String),

    /// No usable structured information; plain status text
    StatusText(String),
}

impl XhrErrorResponse {
    /// Build a response from its parts, parsing `body` as JSON. A body that
    /// is not valid JSON counts as no structured body.
    pub fn from_parts(status: u16, ready_state: u16, status_text: &str, body: &str) -> Self {
        let body = match serde_json::from_str(body) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!("Unparseable error body: {}", e);
                None
            }
        };

        Self {
            status,
            ready_state,
            status_text: status_text.to_string(),
            body,
        }
    }

    /// Decide what kind of failure this response represents.
    pub fn classify(&self) -> FailureKind {
        if self.ready_state == 0 || self.status == 0 {
            return FailureKind::NetworkUnreachable;
        }

        if self.status == 451 {
            return FailureKind::SubscriptionRestricted;
        }

        if let Some(body) = &self.body {
            if let Some(message) = body.error.as_ref().and_then(|d| d.message.as_ref()) {
                return FailureKind::DetailMessage(message.clone());
            }
            if let Some(message) = &body.message {
                return FailureKind::BodyMessage(message.clone());
            }
        }

        FailureKind::StatusText(self.status_text.clone())
    }

    /// Resolve a human-readable message. Every response yields a string.
    pub fn message(&self) -> String {
        match self.classify() {
            FailureKind::NetworkUnreachable => CONNECTION_REFUSED.to_string(),
            FailureKind::SubscriptionRestricted => SUBSCRIPTION_RESTRICTED.to_string(),
            FailureKind::DetailMessage(message) => message,
            FailureKind::BodyMessage(message) => message,
            FailureKind::StatusText(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, status_text: &str, body: Option<&str>) -> XhrErrorResponse {
        match body {
            Some(body) => XhrErrorResponse::from_parts(status, 4, status_text, body),
            None => XhrErrorResponse {
                status,
                ready_state: 4,
                status_text: status_text.to_string(),
                body: None,
            },
        }
    }

    #[test]
    fn zero_status_means_network_unreachable() {
        let err = XhrErrorResponse {
            status: 0,
            ready_state: 4,
            status_text: String::new(),
            body: None,
        };

        assert_eq!(err.classify(), FailureKind::NetworkUnreachable);
        assert_eq!(err.message(), CONNECTION_REFUSED);
    }

    #[test]
    fn zero_ready_state_means_network_unreachable() {
        let err = XhrErrorResponse {
            status: 500,
            ready_state: 0,
            status_text: "Internal Error".to_string(),
            body: None,
        };

        assert_eq!(err.classify(), FailureKind::NetworkUnreachable);
    }

    #[test]
    fn status_451_means_subscription_restricted() {
        let err = response(451, "Unavailable For Legal Reasons", None);

        assert_eq!(err.classify(), FailureKind::SubscriptionRestricted);
        assert_eq!(err.message(), SUBSCRIPTION_RESTRICTED);
    }

    #[test]
    fn nested_detail_message_wins_over_body_message() {
        let err = response(
            500,
            "Internal Error",
            Some(r#"{"_error": {"message": "X"}, "_message": "Y"}"#),
        );

        assert_eq!(err.message(), "X");
    }

    #[test]
    fn body_message_used_when_no_detail() {
        let err = response(500, "Internal Error", Some(r#"{"_message": "Y"}"#));

        assert_eq!(err.message(), "Y");
    }

    #[test]
    fn status_text_used_without_structured_body() {
        let err = response(500, "Internal Error", None);

        assert_eq!(err.message(), "Internal Error");
    }

    #[test]
    fn empty_structured_body_falls_back_to_status_text() {
        let err = response(500, "Internal Error", Some("{}"));

        assert_eq!(err.message(), "Internal Error");
    }

    #[test]
    fn unparseable_body_counts_as_no_body() {
        let err = response(502, "Bad Gateway", Some("<html>nope</html>"));

        assert_eq!(err.message(), "Bad Gateway");
    }

    #[test]
    fn detail_without_message_falls_through() {
        let err = response(500, "Internal Error", Some(r#"{"_error": {}, "_message": "Y"}"#));

        assert_eq!(err.message(), "Y");
    }
}
