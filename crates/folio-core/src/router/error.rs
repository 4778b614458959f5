use crate::capture::CaptureError;
use crate::channel::ChannelError;
use crate::evaluator::GenerationError;
use crate::extract::ExtractionError;

/// Failure of one message-handling cycle.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("extracted {found} characters, need at least {required}")]
    InsufficientContent { found: usize, required: usize },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("screenshot failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("feedback generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("chat platform error: {0}")]
    Channel(#[from] ChannelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unclassified(String),
}

impl PipelineError {
    /// Reply text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientContent { .. } => "⚠️ Could not extract enough text from the PDF. \
                 Make sure it is not a scanned image."
                .to_owned(),
            Self::InvalidUrl(url) => format!("❌ Invalid URL: {url}"),
            Self::Extraction(ExtractionError::FileTooLarge(size)) => {
                format!("❌ File is too large to review ({size} bytes).")
            }
            Self::Extraction(e) => format!("❌ Error processing file: {e}"),
            Self::Capture(CaptureError::InvalidUrl(url)) => format!("❌ Invalid URL: {url}"),
            Self::Capture(CaptureError::Timeout(secs)) => {
                format!("❌ The page took longer than {secs}s to load.")
            }
            Self::Capture(e) => format!("❌ Error capturing screenshot: {e}"),
            Self::Generation(e) => format!("❌ Error getting feedback: {e}"),
            Self::Channel(e) => format!("❌ Error talking to Discord: {e}"),
            Self::Io(e) => format!("❌ Error processing file: {e}"),
            Self::Unclassified(msg) => format!("❌ Error: {msg}"),
        }
    }
}
