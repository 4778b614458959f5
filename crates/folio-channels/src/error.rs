//! Error types for folio-channels.

use folio_core::ChannelError;

/// Errors raised by the Discord REST client.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    /// Transport failure or non-success status.
    #[error("Discord HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL could not be used to build an endpoint.
    #[error("invalid Discord endpoint: {0}")]
    Endpoint(String),
}

impl From<DiscordError> for ChannelError {
    fn from(e: DiscordError) -> Self {
        Self::Api(e.to_string())
    }
}
