//! Plain-text extraction from uploaded documents.

use std::future::Future;
use std::path::Path;

/// Default maximum document size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("PDF error: {0}")]
    Pdf(String),
}

pub trait TextExtractor: Send + Sync {
    /// Extract the text content of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    fn extract(&self, path: &Path)
    -> impl Future<Output = Result<String, ExtractionError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PdfExtractor {
    pub max_file_size: u64,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl PdfExtractor {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let path = tokio::fs::canonicalize(path).await?;

        let meta = tokio::fs::metadata(&path).await?;
        if meta.len() > self.max_file_size {
            return Err(ExtractionError::FileTooLarge(meta.len()));
        }

        let content = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text(&path).map_err(|e| ExtractionError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| ExtractionError::Io(std::io::Error::other(e)))??;

        Ok(content.trim().to_owned())
    }
}
