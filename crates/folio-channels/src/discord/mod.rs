//! Discord channel adapter using Gateway WebSocket + REST API.

pub mod gateway;
pub mod rest;

use folio_core::config::DiscordConfig;
use folio_core::{Attachment, ChannelError, ChatChannel, InboundMessage};
use tokio::sync::mpsc;

/// Who may use the bot. Empty lists allow everyone.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub allowed_user_ids: Vec<String>,
    pub allowed_role_ids: Vec<String>,
    pub allowed_channel_ids: Vec<String>,
}

impl From<&DiscordConfig> for AccessPolicy {
    fn from(config: &DiscordConfig) -> Self {
        Self {
            allowed_user_ids: config.allowed_user_ids.clone(),
            allowed_role_ids: config.allowed_role_ids.clone(),
            allowed_channel_ids: config.allowed_channel_ids.clone(),
        }
    }
}

impl AccessPolicy {
    #[must_use]
    pub fn is_authorized(&self, msg: &InboundMessage) -> bool {
        if !self.allowed_channel_ids.is_empty()
            && !self.allowed_channel_ids.contains(&msg.channel_id)
        {
            return false;
        }
        if self.allowed_user_ids.is_empty() && self.allowed_role_ids.is_empty() {
            return true;
        }
        if self.allowed_user_ids.contains(&msg.author_id) {
            return true;
        }
        msg.author_roles
            .iter()
            .any(|r| self.allowed_role_ids.contains(r))
    }
}

/// Inbound side: authorized messages from the gateway.
#[derive(Debug)]
pub struct DiscordInbox {
    rx: mpsc::Receiver<InboundMessage>,
    access: AccessPolicy,
}

impl DiscordInbox {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<InboundMessage>, access: AccessPolicy) -> Self {
        Self { rx, access }
    }

    /// Next authorized message, or `None` once the gateway has stopped.
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        loop {
            let msg = self.rx.recv().await?;
            if self.access.is_authorized(&msg) {
                return Some(msg);
            }
            tracing::warn!(
                "rejected discord message from unauthorized user {} in channel {}",
                msg.author_id,
                msg.channel_id
            );
        }
    }
}

/// Outbound side: reactions, replies, and attachment downloads over REST.
#[derive(Debug)]
pub struct DiscordChannel {
    rest: rest::RestClient,
}

impl DiscordChannel {
    #[must_use]
    pub fn new(rest: rest::RestClient) -> Self {
        Self { rest }
    }

    /// Spawn the gateway listener and return both halves of the adapter.
    #[must_use]
    pub fn connect(token: &str, access: AccessPolicy) -> (Self, DiscordInbox) {
        let rx = gateway::spawn_gateway(token.to_owned());
        let channel = Self::new(rest::RestClient::new(token.to_owned()));
        (channel, DiscordInbox::new(rx, access))
    }
}

impl ChatChannel for DiscordChannel {
    async fn react(&self, message: &InboundMessage, emoji: &str) -> Result<(), ChannelError> {
        self.rest
            .add_reaction(&message.channel_id, &message.id, emoji)
            .await?;
        Ok(())
    }

    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), ChannelError> {
        self.rest
            .reply(&message.channel_id, &message.id, text)
            .await?;
        Ok(())
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<(), ChannelError> {
        self.rest.send_message(channel_id, text).await?;
        Ok(())
    }

    async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, ChannelError> {
        let bytes = self.rest.download(&attachment.url).await?;
        tracing::debug!(
            filename = %attachment.filename,
            bytes = bytes.len(),
            "attachment downloaded"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn message(author: &str, channel: &str, roles: &[&str]) -> InboundMessage {
        InboundMessage {
            id: "m1".into(),
            channel_id: channel.into(),
            author_id: author.into(),
            author_roles: roles.iter().map(|r| (*r).to_owned()).collect(),
            ..InboundMessage::default()
        }
    }

    fn policy(users: &[&str], roles: &[&str], channels: &[&str]) -> AccessPolicy {
        let own = |v: &[&str]| v.iter().map(|s| (*s).to_owned()).collect();
        AccessPolicy {
            allowed_user_ids: own(users),
            allowed_role_ids: own(roles),
            allowed_channel_ids: own(channels),
        }
    }

    #[test]
    fn empty_policy_allows_everyone() {
        assert!(AccessPolicy::default().is_authorized(&message("u", "c", &[])));
    }

    #[test]
    fn channel_allowlist_enforced() {
        let p = policy(&[], &[], &["c1"]);
        assert!(p.is_authorized(&message("u", "c1", &[])));
        assert!(!p.is_authorized(&message("u", "c2", &[])));
    }

    #[test]
    fn user_or_role_allowlist() {
        let p = policy(&["u1"], &["mentor"], &[]);
        assert!(p.is_authorized(&message("u1", "c", &[])));
        assert!(p.is_authorized(&message("u2", "c", &["mentor"])));
        assert!(!p.is_authorized(&message("u3", "c", &["student"])));
    }

    #[test]
    fn policy_from_config() {
        let config = DiscordConfig {
            allowed_user_ids: vec!["1".into()],
            allowed_role_ids: vec![],
            allowed_channel_ids: vec!["9".into()],
        };
        let p = AccessPolicy::from(&config);
        assert_eq!(p.allowed_user_ids, vec!["1".to_owned()]);
        assert_eq!(p.allowed_channel_ids, vec!["9".to_owned()]);
    }

    #[tokio::test]
    async fn inbox_filters_unauthorized() {
        let (tx, rx) = mpsc::channel(8);
        let mut inbox = DiscordInbox::new(rx, policy(&["ok"], &[], &[]));
        tx.send(message("intruder", "c", &[])).await.unwrap();
        tx.send(message("ok", "c", &[])).await.unwrap();
        drop(tx);

        assert_eq!(inbox.recv().await.unwrap().author_id, "ok");
        assert!(inbox.recv().await.is_none());
    }

    #[tokio::test]
    async fn channel_reply_targets_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/c1/messages"))
            .and(body_partial_json(serde_json::json!({
                "message_reference": { "message_id": "m1" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "2" })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = DiscordChannel::new(rest::RestClient::new("t".into()).with_base_url(server.uri()));
        channel
            .reply(&message("u", "c1", &[]), "feedback")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn channel_errors_map_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let channel = DiscordChannel::new(rest::RestClient::new("t".into()).with_base_url(server.uri()));
        let err = channel
            .react(&message("u", "c1", &[]), "✅")
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Api(_)));
    }
}
