//! Routing client error types.

/// Errors from the routing service client.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Error status code or an error `code` field
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by routing service")]
    RateLimited,
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_ref()
        .map(|body| format!(" (body: {body})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn error_display() {
        let err = RoutingError::Api {
            status: 400,
            message: "InvalidQuery".into(),
        };
        assert_eq!(err.to_string(), "API error 400: InvalidQuery");

        let err = RoutingError::Json {
            message: "missing field `routes`".into(),
            body: Some("{}".into()),
        };
        assert_eq!(
            err.to_string(),
            "JSON parse error: missing field `routes` (body: {})"
        );

        let err = RoutingError::Json {
            message: "expected value".into(),
            body: None,
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");

        assert_eq!(
            RoutingError::RateLimited.to_string(),
            "rate limited by routing service"
        );
    }

    #[tokio::test]
    async fn http_errors_convert_and_keep_source() {
        // Nothing listens on port 1.
        let http = reqwest::Client::new()
            .get("http://127.0.0.1:1/route")
            .send()
            .await
            .unwrap_err();

        let err = RoutingError::from(http);
        assert!(matches!(err, RoutingError::Http(_)));
        assert!(err.to_string().starts_with("HTTP error: "));
        assert!(err.source().is_some());
        assert!(RoutingError::RateLimited.source().is_none());
    }
}
