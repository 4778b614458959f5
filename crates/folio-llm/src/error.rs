#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{provider} API request failed (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = LlmError::Api {
            provider: "claude",
            status: 529,
            message: "Overloaded".into(),
        };
        assert_eq!(
            err.to_string(),
            "claude API request failed (status 529): Overloaded"
        );
    }

    #[test]
    fn empty_response_display() {
        let err = LlmError::EmptyResponse { provider: "claude" };
        assert_eq!(err.to_string(), "empty response from claude");
    }
}
