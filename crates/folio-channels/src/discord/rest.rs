//! Discord REST API client for message operations.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DiscordError;

const BASE_URL: &str = "https://discord.com/api/v10";

pub struct RestClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_reference: Option<MessageReference<'a>>,
}

#[derive(Serialize)]
struct MessageReference<'a> {
    message_id: &'a str,
    fail_if_not_exists: bool,
}

impl RestClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            client: folio_llm::http::default_client(),
            token,
            base_url: BASE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Join percent-encoded path segments onto the API base.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DiscordError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| DiscordError::Endpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| DiscordError::Endpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn create_message(
        &self,
        channel_id: &str,
        body: &CreateMessage<'_>,
    ) -> Result<DiscordMessage, DiscordError> {
        let url = self.endpoint(&["channels", channel_id, "messages"])?;
        let msg = self
            .client
            .post(url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(msg)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    pub async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<DiscordMessage, DiscordError> {
        self.create_message(
            channel_id,
            &CreateMessage {
                content,
                message_reference: None,
            },
        )
        .await
    }

    /// Post `content` as a reply to `message_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    pub async fn reply(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<DiscordMessage, DiscordError> {
        self.create_message(
            channel_id,
            &CreateMessage {
                content,
                message_reference: Some(MessageReference {
                    message_id,
                    fail_if_not_exists: false,
                }),
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    pub async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), DiscordError> {
        let url = self.endpoint(&[
            "channels",
            channel_id,
            "messages",
            message_id,
            "reactions",
            emoji,
            "@me",
        ])?;
        self.client
            .put(url)
            .header("Authorization", self.auth_header())
            .header("Content-Length", "0")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetch attachment bytes from the CDN.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, DiscordError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
