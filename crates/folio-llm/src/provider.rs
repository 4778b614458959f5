use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Raw image bytes plus the media type the model should decode them as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessagePart {
    Text { text: String },
    Image(Box<ImageData>),
}

#[derive(Clone, Debug)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub parts: Vec<MessagePart>,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            parts: vec![],
        }
    }

    /// Build a user turn whose images come before the instruction text.
    #[must_use]
    pub fn user_with_images(images: Vec<ImageData>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut parts: Vec<MessagePart> = images
            .into_iter()
            .map(|img| MessagePart::Image(Box::new(img)))
            .collect();
        parts.push(MessagePart::Text { text: text.clone() });
        Self {
            role: Role::User,
            content: text,
            parts,
        }
    }

    #[must_use]
    pub fn has_images(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, MessagePart::Image(_)))
    }

    /// Flattened text of the message, ignoring image parts.
    #[must_use]
    pub fn to_llm_content(&self) -> &str {
        &self.content
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages to the model and return the assistant text.
    ///
    /// `max_tokens` caps the length of the generated response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response is invalid.
    fn chat(
        &self,
        messages: &[Message],
        max_tokens: u32,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(bytes: &[u8]) -> ImageData {
        ImageData {
            data: bytes.to_vec(),
            mime_type: "image/png".into(),
        }
    }

    #[test]
    fn user_message_has_no_parts() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.to_llm_content(), "hello");
        assert!(msg.parts.is_empty());
        assert!(!msg.has_images());
    }

    #[test]
    fn user_with_images_puts_text_last() {
        let msg = Message::user_with_images(vec![png(b"a"), png(b"b")], "review this");
        assert_eq!(msg.parts.len(), 3);
        assert!(matches!(msg.parts[0], MessagePart::Image(_)));
        assert!(matches!(msg.parts[1], MessagePart::Image(_)));
        assert_eq!(
            msg.parts[2],
            MessagePart::Text {
                text: "review this".into()
            }
        );
        assert!(msg.has_images());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
