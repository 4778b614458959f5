use std::future::Future;

/// Typed error for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform API rejected or failed the request.
    #[error("platform API error: {0}")]
    Api(String),

    /// Channel closed (mpsc send/recv failure).
    #[error("channel closed")]
    ChannelClosed,

    /// Catch-all for provider-specific errors.
    #[error("{0}")]
    Other(String),
}

/// File attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub content_type: Option<String>,
}

impl Attachment {
    /// Whether the attachment looks like a PDF by name or declared content type.
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.filename.to_lowercase().ends_with(".pdf")
            || self
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("application/pdf"))
    }
}

/// Incoming message from a channel.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub author_roles: Vec<String>,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl InboundMessage {
    /// First attachment that looks like a PDF document.
    #[must_use]
    pub fn pdf_attachment(&self) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.is_pdf())
    }
}

/// Outbound side of a chat platform.
///
/// Methods take `&self` so one client can serve many in-flight messages.
pub trait ChatChannel: Send + Sync {
    /// Add an emoji reaction to `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform request fails.
    fn react(
        &self,
        message: &InboundMessage,
        emoji: &str,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Reply to `message`, referencing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform request fails.
    fn reply(
        &self,
        message: &InboundMessage,
        text: &str,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Post a plain message to a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform request fails.
    fn send(
        &self,
        channel_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Fetch the raw bytes of an attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    fn download(
        &self,
        attachment: &Attachment,
    ) -> impl Future<Output = Result<Vec<u8>, ChannelError>> + Send;
}
