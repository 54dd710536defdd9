use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Gateway returned {status}: {body}")]
    GatewayStatus { status: u16, body: String },

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuantError {
    /// True for failures that happened before or during transport, as opposed
    /// to a response that arrived but could not be understood.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QuantError::Http(_) | QuantError::GatewayStatus { .. } | QuantError::Gateway(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QuantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_display_includes_code_and_body() {
        let error = QuantError::GatewayStatus {
            status: 502,
            body: "upstream down".to_string(),
        };
        assert_eq!(error.to_string(), "Gateway returned 502: upstream down");
        assert!(error.is_transport());
    }

    #[test]
    fn shape_errors_are_not_transport() {
        assert!(!QuantError::Shape("missing message".to_string()).is_transport());
        assert!(!QuantError::Internal("bug".to_string()).is_transport());
    }
}
