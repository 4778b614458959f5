use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, MessagePart, Role};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl fmt::Debug for ClaudeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Clone for ClaudeProvider {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

impl ClaudeProvider {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: crate::http::default_client(),
            api_key,
            model,
            api_url: DEFAULT_API_URL.to_owned(),
        }
    }

    /// Point the provider at a different Messages endpoint (proxies, tests).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, messages: &[Message], max_tokens: u32) -> reqwest::RequestBuilder {
        let (system, chat_messages) = split_messages(messages);

        let body = RequestBody {
            model: &self.model,
            max_tokens,
            system,
            messages: chat_messages,
        };

        self.client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
    }

    async fn send_request(&self, messages: &[Message], max_tokens: u32) -> Result<String, LlmError> {
        let response = self.build_request(messages, max_tokens).send().await?;
        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Claude API error {status}: {text}");
            return Err(LlmError::Api {
                provider: "claude",
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let resp: ApiResponse = serde_json::from_str(&text)?;

        if let Some(ref usage) = resp.usage {
            log_usage(usage);
        }

        resp.content
            .into_iter()
            .find_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .ok_or(LlmError::EmptyResponse { provider: "claude" })
    }
}

impl LlmProvider for ClaudeProvider {
    async fn chat(&self, messages: &[Message], max_tokens: u32) -> Result<String, LlmError> {
        self.send_request(messages, max_tokens).await
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}

/// The `error.message` of an API error body, or the raw body when it is not JSON.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map_or_else(|_| body.trim().to_owned(), |parsed| parsed.error.message)
}

fn log_usage(usage: &ApiUsage) {
    tracing::debug!(
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "Claude API usage"
    );
}

fn split_messages(messages: &[Message]) -> (Option<String>, Vec<ApiMessage>) {
    let mut system_parts = Vec::new();
    let mut chat = Vec::new();

    for msg in messages {
        let role = match msg.role {
            Role::System => {
                system_parts.push(msg.to_llm_content().to_owned());
                continue;
            }
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        let content = if msg.has_images() {
            ApiContent::Blocks(msg.parts.iter().filter_map(to_content_block).collect())
        } else {
            ApiContent::Text(msg.to_llm_content().to_owned())
        };
        chat.push(ApiMessage { role, content });
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, chat)
}

fn to_content_block(part: &MessagePart) -> Option<ContentBlock> {
    match part {
        MessagePart::Text { text } if text.is_empty() => None,
        MessagePart::Text { text } => Some(ContentBlock::Text { text: text.clone() }),
        MessagePart::Image(img) => Some(ContentBlock::Image {
            source: ImageSource {
                source_type: "base64",
                media_type: img.mime_type.clone(),
                data: STANDARD.encode(&img.data),
            },
        }),
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize, Debug)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Serialize, Debug)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Deserialize, Debug)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::provider::ImageData;

    fn provider_for(server: &MockServer) -> ClaudeProvider {
        ClaudeProvider::new("test-key".into(), DEFAULT_MODEL.into())
            .with_api_url(format!("{}/v1/messages", server.uri()))
    }

    #[test]
    fn split_messages_extracts_system() {
        let messages = vec![
            Message {
                role: Role::System,
                content: "You are a hiring manager.".into(),
                parts: vec![],
            },
            Message::user("Hi"),
        ];

        let (system, chat) = split_messages(&messages);
        assert_eq!(system.unwrap(), "You are a hiring manager.");
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].role, "user");
    }

    #[test]
    fn split_messages_no_system() {
        let (system, chat) = split_messages(&[Message::user("Hi")]);
        assert!(system.is_none());
        assert!(matches!(chat[0].content, ApiContent::Text(ref t) if t == "Hi"));
    }

    #[test]
    fn image_blocks_serialize_before_text() {
        let msg = Message::user_with_images(
            vec![ImageData {
                data: vec![1, 2, 3],
                mime_type: "image/jpeg".into(),
            }],
            "Analyze the portfolio image(s) provided.",
        );
        let (_, chat) = split_messages(&[msg]);
        let json = serde_json::to_value(&chat[0]).unwrap();

        let blocks = json["content"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "image");
        assert_eq!(blocks[0]["source"]["type"], "base64");
        assert_eq!(blocks[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(blocks[0]["source"]["data"], STANDARD.encode([1u8, 2, 3]));
        assert_eq!(blocks[1]["type"], "text");
        assert_eq!(blocks[1]["text"], "Analyze the portfolio image(s) provided.");
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = ClaudeProvider::new("sk-secret".into(), DEFAULT_MODEL.into());
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn response_skips_non_text_blocks() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"feedback"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.content.len(), 2);
        assert!(matches!(resp.content[0], ResponseBlock::Other));
    }

    #[tokio::test]
    async fn chat_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "Strong case studies." }],
                "usage": { "input_tokens": 10, "output_tokens": 4 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = provider_for(&server)
            .chat(&[Message::user("review")], 1500)
            .await
            .unwrap();
        assert_eq!(out, "Strong case studies.");
    }

    #[tokio::test]
    async fn chat_sends_max_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "max_tokens": 2000,
                "model": DEFAULT_MODEL
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "ok" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = provider_for(&server)
            .chat(&[Message::user("review")], 2000)
            .await
            .unwrap();
        assert_eq!(out, "ok");
    }

    #[tokio::test]
    async fn chat_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("review")], 1500)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::Api {
                provider: "claude",
                status: 529,
                ..
            }
        ));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn chat_error_carries_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "type": "error",
                "error": {
                    "type": "invalid_request_error",
                    "message": "Your credit balance is too low"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("review")], 1500)
            .await
            .unwrap_err();
        assert!(
            matches!(err, LlmError::Api { status: 400, ref message, .. } if message == "Your credit balance is too low")
        );
        assert!(err.to_string().contains("credit balance is too low"));
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
        assert_eq!(
            error_message(r#"{"error":{"message":"prompt is too long"}}"#),
            "prompt is too long"
        );
    }

    #[tokio::test]
    async fn chat_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("review")], 1500)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn chat_invalid_json_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json {{"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("review")], 1500)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Json(_)));
    }
}
