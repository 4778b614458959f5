//! Model-backed feedback generation for résumés and portfolios.

mod prompts;
mod quick_check;

pub use prompts::{EvalMode, PromptTemplate};
pub use quick_check::{QuickCheck, quick_check};

use std::path::{Path, PathBuf};

use folio_llm::provider::{ImageData, Message};
use folio_llm::{LlmError, LlmProvider};

use crate::classifier::Category;

const TEXT_CHAR_LIMIT: usize = 15_000;
const HYBRID_CHAR_LIMIT: usize = 10_000;
const VISUAL_IMAGE_LIMIT: usize = 10;
const HYBRID_IMAGE_LIMIT: usize = 5;
const TEXT_MAX_TOKENS: u32 = 1500;
const VISUAL_MAX_TOKENS: u32 = 2000;
const HYBRID_MAX_TOKENS: u32 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("inference failed: {0}")]
    Inference(#[from] LlmError),

    #[error("none of the images could be read")]
    NoImages,
}

/// What the model is asked to review.
#[derive(Debug, Clone)]
pub enum Subject {
    Text(String),
    Images(Vec<PathBuf>),
    Hybrid { text: String, images: Vec<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub category: Category,
    pub subject: Subject,
}

impl EvaluationRequest {
    #[must_use]
    pub fn text(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            subject: Subject::Text(text.into()),
        }
    }

    #[must_use]
    pub fn images(category: Category, images: Vec<PathBuf>) -> Self {
        Self {
            category,
            subject: Subject::Images(images),
        }
    }

    #[must_use]
    pub fn hybrid(category: Category, text: impl Into<String>, images: Vec<PathBuf>) -> Self {
        Self {
            category,
            subject: Subject::Hybrid {
                text: text.into(),
                images,
            },
        }
    }

    /// Effective mode; a hybrid request without images is evaluated as text.
    #[must_use]
    pub fn mode(&self) -> EvalMode {
        match &self.subject {
            Subject::Text(_) => EvalMode::Text,
            Subject::Images(_) => EvalMode::Visual,
            Subject::Hybrid { images, .. } if images.is_empty() => EvalMode::Text,
            Subject::Hybrid { .. } => EvalMode::Hybrid,
        }
    }

    #[must_use]
    pub fn template(&self) -> PromptTemplate {
        PromptTemplate::select(self.category, self.mode())
    }
}

/// Media type for an image file, by extension.
#[must_use]
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct FeedbackGenerator<P> {
    provider: P,
}

impl<P: LlmProvider> FeedbackGenerator<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Produce written feedback for the request.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NoImages`] when no image could be read, or
    /// [`GenerationError::Inference`] when the model call fails.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<String, GenerationError> {
        let template = request.template();
        let mode = request.mode();
        tracing::debug!(
            category = %request.category,
            mode = mode.as_str(),
            template = template.key(),
            "generating feedback"
        );

        let (message, max_tokens) = match &request.subject {
            Subject::Text(text) => text_message(template, text),
            Subject::Hybrid { text, images } if images.is_empty() => text_message(template, text),
            Subject::Images(paths) => {
                let images = load_images(paths, VISUAL_IMAGE_LIMIT).await?;
                let prompt = template.render("");
                (Message::user_with_images(images, prompt), VISUAL_MAX_TOKENS)
            }
            Subject::Hybrid { text, images } => {
                let images = load_images(images, HYBRID_IMAGE_LIMIT).await?;
                let prompt = template.render(truncate_chars(text, HYBRID_CHAR_LIMIT));
                (Message::user_with_images(images, prompt), HYBRID_MAX_TOKENS)
            }
        };

        let feedback = self.provider.chat(&[message], max_tokens).await?;
        tracing::info!(
            provider = self.provider.name(),
            template = template.key(),
            chars = feedback.chars().count(),
            "feedback generated"
        );
        Ok(feedback)
    }
}

fn text_message(template: PromptTemplate, text: &str) -> (Message, u32) {
    let prompt = template.render(truncate_chars(text, TEXT_CHAR_LIMIT));
    (Message::user(prompt), TEXT_MAX_TOKENS)
}

async fn load_images(paths: &[PathBuf], limit: usize) -> Result<Vec<ImageData>, GenerationError> {
    let mut images = Vec::with_capacity(paths.len().min(limit));
    for path in paths.iter().take(limit) {
        match tokio::fs::read(path).await {
            Ok(data) => images.push(ImageData {
                data,
                mime_type: media_type_for(path).to_owned(),
            }),
            Err(e) => tracing::warn!("skipping unreadable image {}: {e}", path.display()),
        }
    }
    if images.is_empty() {
        return Err(GenerationError::NoImages);
    }
    Ok(images)
}
