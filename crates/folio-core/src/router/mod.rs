//! Per-message dispatch: document review, link review, or prefix command.

mod commands;
mod error;

pub use commands::Command;
pub use error::PipelineError;

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_llm::LlmProvider;
use tokio::task::JoinHandle;

use crate::capture::PageCapturer;
use crate::channel::{Attachment, ChatChannel, InboundMessage};
use crate::chunker::{ChunkLimits, chunk, label_segments};
use crate::classifier::{Category, classify};
use crate::config::Config;
use crate::evaluator::{EvaluationRequest, FeedbackGenerator, quick_check};
use crate::extract::{ExtractionError, TextExtractor};
use crate::links::{find_url, is_valid_url, normalize_url};

pub const RECEIVED: &str = "👀";
pub const EXTRACTING: &str = "⚙️";
pub const CAPTURING: &str = "📸";
pub const CLASSIFYING: &str = "🔍";
pub const GENERATING: &str = "🤔";
pub const DONE: &str = "✅";

const STAGED_PREFIX: &str = "folio_";

#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub command_prefix: String,
    pub min_text_chars: usize,
    pub max_attachment_bytes: u64,
    pub staging_dir: PathBuf,
    pub chunk_limits: ChunkLimits,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RouterSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            command_prefix: config.bot.command_prefix.clone(),
            min_text_chars: config.bot.min_text_chars,
            max_attachment_bytes: config.bot.max_attachment_bytes,
            staging_dir: config.bot.staging_dir(),
            chunk_limits: config.chunking.limits(),
        }
    }
}

/// Which handler an inbound message is routed to.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Document(&'a Attachment),
    Link(&'a str),
    Command(Command),
    Ignore,
}

impl<'a> Route<'a> {
    /// First match wins: PDF attachment, then link, then prefix command.
    #[must_use]
    pub fn of(msg: &'a InboundMessage, prefix: &str) -> Self {
        if let Some(attachment) = msg.pdf_attachment() {
            return Self::Document(attachment);
        }
        if let Some(url) = find_url(&msg.content) {
            return Self::Link(url);
        }
        Command::parse(&msg.content, prefix).map_or(Self::Ignore, Self::Command)
    }
}

pub struct Router<C, P, E, S> {
    channel: C,
    generator: FeedbackGenerator<P>,
    extractor: E,
    capturer: S,
    settings: RouterSettings,
}

impl<C, P, E, S> Router<C, P, E, S>
where
    C: ChatChannel,
    P: LlmProvider,
    E: TextExtractor,
    S: PageCapturer,
{
    #[must_use]
    pub fn new(
        channel: C,
        generator: FeedbackGenerator<P>,
        extractor: E,
        capturer: S,
        settings: RouterSettings,
    ) -> Self {
        Self {
            channel,
            generator,
            extractor,
            capturer,
            settings,
        }
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    #[must_use]
    pub fn generator(&self) -> &FeedbackGenerator<P> {
        &self.generator
    }

    /// Handle one inbound message to completion.
    ///
    /// Failures are reported to the user as a reply and logged; nothing propagates.
    pub async fn handle(&self, msg: &InboundMessage) {
        let result = match Route::of(msg, &self.settings.command_prefix) {
            Route::Document(attachment) => self.review_document(msg, attachment).await,
            Route::Link(url) => self.review_link(msg, url).await,
            Route::Command(command) => self.run_command(msg, command).await,
            Route::Ignore => return,
        };

        if let Err(e) = result {
            tracing::warn!(message_id = %msg.id, "request failed: {e}");
            self.report(msg, &e).await;
        }
    }

    async fn report(&self, msg: &InboundMessage, err: &PipelineError) {
        if let Err(reply_err) = self.channel.reply(msg, &err.user_message()).await {
            tracing::warn!(message_id = %msg.id, "failed to report error: {reply_err}");
        }
    }

    async fn run_command(&self, msg: &InboundMessage, command: Command) -> Result<(), PipelineError> {
        tracing::debug!(?command, "running command");
        let response = command.response(&self.settings.command_prefix);
        self.channel.send(&msg.channel_id, &response).await?;
        Ok(())
    }

    async fn review_document(
        &self,
        msg: &InboundMessage,
        attachment: &Attachment,
    ) -> Result<(), PipelineError> {
        tracing::info!(filename = %attachment.filename, size = attachment.size, "document received");
        self.react(msg, RECEIVED).await;

        if attachment.size > self.settings.max_attachment_bytes {
            return Err(ExtractionError::FileTooLarge(attachment.size).into());
        }

        let bytes = self.channel.download(attachment).await?;
        let path = self.staged_path(&attachment.filename);
        tokio::fs::write(&path, &bytes).await?;

        self.react(msg, EXTRACTING).await;
        let extracted = self.extractor.extract(&path).await;
        remove_staged(&path).await;
        let text = extracted?;

        let found = text.chars().count();
        if found < self.settings.min_text_chars {
            return Err(PipelineError::InsufficientContent {
                found,
                required: self.settings.min_text_chars,
            });
        }

        self.react(msg, CLASSIFYING).await;
        let classification = classify(&text, &attachment.filename);
        tracing::info!(
            category = %classification.category,
            confidence = classification.confidence,
            "document classified"
        );
        if classification.category == Category::Resume {
            let check = quick_check(&text);
            tracing::info!(
                completeness = check.completeness_score,
                words = check.word_count,
                ux_tools = check.has_ux_tools,
                research = check.has_research_methods,
                "resume quick check"
            );
        }

        self.react(msg, GENERATING).await;
        let request = EvaluationRequest::text(classification.category, text);
        let feedback = self.generator.evaluate(&request).await?;

        self.deliver(msg, &feedback).await?;
        self.react(msg, DONE).await;
        Ok(())
    }

    async fn review_link(&self, msg: &InboundMessage, url: &str) -> Result<(), PipelineError> {
        tracing::info!(url, "link received");
        self.react(msg, RECEIVED).await;

        if !is_valid_url(url) {
            return Err(PipelineError::InvalidUrl(url.to_owned()));
        }
        let url = normalize_url(url);

        self.react(msg, CAPTURING).await;
        let screenshots = self.capturer.capture(&url).await?;

        self.react(msg, GENERATING).await;
        let paths = screenshots.iter().map(|s| s.path().to_path_buf()).collect();
        let request = EvaluationRequest::images(Category::Portfolio, paths);
        let generated = self.generator.evaluate(&request).await;

        for shot in screenshots {
            let path = shot.path().to_path_buf();
            if let Err(e) = shot.remove() {
                tracing::warn!("failed to remove screenshot {}: {e}", path.display());
            }
        }
        let feedback = generated?;

        self.deliver(msg, &feedback).await?;
        self.react(msg, DONE).await;
        Ok(())
    }

    /// First segment as a reply, the rest as follow-up messages.
    async fn deliver(&self, msg: &InboundMessage, feedback: &str) -> Result<(), PipelineError> {
        let segments = label_segments(&chunk(feedback, self.settings.chunk_limits));
        let mut segments = segments.iter();
        if let Some(first) = segments.next() {
            self.channel.reply(msg, first).await?;
        }
        for segment in segments {
            self.channel.send(&msg.channel_id, segment).await?;
        }
        Ok(())
    }

    async fn react(&self, msg: &InboundMessage, emoji: &str) {
        if let Err(e) = self.channel.react(msg, emoji).await {
            tracing::warn!(message_id = %msg.id, emoji, "failed to add reaction: {e}");
        }
    }

    // TODO: staged names derive only from the attachment filename, so two concurrent
    // uploads of the same name overwrite each other; add the message id to the name.
    fn staged_path(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map_or_else(|| "upload.pdf".into(), |n| n.to_string_lossy());
        self.settings
            .staging_dir
            .join(format!("{STAGED_PREFIX}{name}"))
    }
}

impl<C, P, E, S> Router<C, P, E, S>
where
    C: ChatChannel + 'static,
    P: LlmProvider + 'static,
    E: TextExtractor + 'static,
    S: PageCapturer + 'static,
{
    /// Handle `msg` on its own task.
    ///
    /// A panic inside the handler is logged and answered with a generic error reply.
    pub fn spawn(self: &Arc<Self>, msg: InboundMessage) -> JoinHandle<()> {
        let router = Arc::clone(self);
        tokio::spawn(async move {
            let worker = {
                let router = Arc::clone(&router);
                let msg = msg.clone();
                tokio::spawn(async move { router.handle(&msg).await })
            };
            if let Err(e) = worker.await
                && e.is_panic()
            {
                let payload = e.into_panic();
                tracing::warn!(
                    message_id = %msg.id,
                    "handler panicked: {}",
                    panic_reason(payload.as_ref())
                );
                let err = PipelineError::Unclassified(
                    "something went wrong while reviewing this. Please try again.".into(),
                );
                router.report(&msg, &err).await;
            }
        })
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

async fn remove_staged(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("failed to remove staged file {}: {e}", path.display());
    }
}
