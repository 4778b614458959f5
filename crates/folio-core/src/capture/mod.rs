//! Full-page screenshots of portfolio links through headless Chromium.

mod devtools;

pub use devtools::DevTools;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::{TempDir, TempPath};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::config::CaptureConfig;
use crate::links::{is_valid_url, normalize_url};

const DEVTOOLS_BANNER: &str = "DevTools listening on ";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);
const EXIT_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to launch browser `{browser}`: {source}")]
    Launch {
        browser: String,
        source: std::io::Error,
    },

    #[error("page did not finish loading within {0}s")]
    Timeout(u64),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser failed: {0}")]
    Browser(String),

    #[error("devtools protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered page image on disk, deleted when dropped.
#[derive(Debug)]
pub struct Screenshot {
    path: TempPath,
}

impl Screenshot {
    #[must_use]
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the image now, reporting failures instead of swallowing them in `Drop`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub fn remove(self) -> std::io::Result<()> {
        self.path.close()
    }
}

pub trait PageCapturer: Send + Sync {
    /// Render `url` and return one or more images of the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the page cannot be rendered.
    fn capture(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<Screenshot>, CaptureError>> + Send;
}

/// Running headless browser with a throwaway profile, driven over DevTools.
///
/// The browser process and the profile directory are released when the session is
/// dropped, on every exit path. `close` does the same gracefully.
#[derive(Debug)]
pub struct BrowserSession {
    child: Child,
    profile: TempDir,
    devtools: DevTools,
    settle: Duration,
    timeout: Duration,
}

impl BrowserSession {
    /// Start the browser and connect to its DevTools endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be started or never exposes DevTools.
    pub async fn launch(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let profile = tempfile::Builder::new()
            .prefix("folio_browser_")
            .tempdir()?;
        let mut child = command(config, profile.path())
            .spawn()
            .map_err(|source| CaptureError::Launch {
                browser: config.browser_path.clone(),
                source,
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CaptureError::Browser("stderr was not captured".into()))?;

        let ws_url = tokio::time::timeout(STARTUP_TIMEOUT, wait_for_devtools(stderr))
            .await
            .map_err(|_| CaptureError::Browser("DevTools endpoint never appeared".into()))??;
        let devtools = DevTools::connect(&ws_url).await?;
        tracing::debug!(profile = %profile.path().display(), %ws_url, "browser session acquired");

        Ok(Self {
            child,
            profile,
            devtools,
            settle: Duration::from_millis(config.settle_delay_ms),
            timeout: Duration::from_secs(config.navigation_timeout_secs),
        })
    }

    /// Navigate to `url`, wait for the network to go idle plus the settle delay, and
    /// write a PNG of the whole document to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error on navigation failure, timeout, or an empty capture.
    pub async fn screenshot(&mut self, url: &str, output: &Path) -> Result<(), CaptureError> {
        let png = self
            .devtools
            .capture_full_page(url, self.timeout, self.settle)
            .await?;
        if png.is_empty() {
            return Err(CaptureError::Browser("browser returned an empty screenshot".into()));
        }
        tokio::fs::write(output, &png).await?;
        Ok(())
    }

    /// Shut the browser down and remove its profile directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be killed or the profile cannot be removed.
    pub async fn close(mut self) -> Result<(), CaptureError> {
        self.devtools.close_browser().await;
        if tokio::time::timeout(EXIT_GRACE, self.child.wait()).await.is_err() {
            self.child.kill().await?;
        }
        let path: PathBuf = self.profile.path().to_path_buf();
        self.profile.close()?;
        tracing::debug!(profile = %path.display(), "browser session released");
        Ok(())
    }
}

fn command(config: &CaptureConfig, profile: &Path) -> Command {
    let mut cmd = Command::new(&config.browser_path);
    cmd.arg("--headless=new")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-gpu")
        .arg("--hide-scrollbars")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--remote-debugging-port=0")
        .arg(format!("--user-data-dir={}", profile.display()))
        .arg(format!(
            "--window-size={},{}",
            config.viewport_width, config.viewport_height
        ))
        .arg("about:blank")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

fn devtools_url(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix(DEVTOOLS_BANNER)
        .filter(|url| url.starts_with("ws://"))
}

/// Read browser stderr until the DevTools banner, then keep draining it in the background.
async fn wait_for_devtools<R>(stderr: R) -> Result<String, CaptureError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(stderr).lines();
    let mut last = String::new();
    while let Some(line) = lines.next_line().await? {
        if let Some(url) = devtools_url(&line) {
            let url = url.to_owned();
            tokio::spawn(async move {
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::trace!("browser: {line}");
                }
            });
            return Ok(url);
        }
        if !line.trim().is_empty() {
            last = line;
        }
    }
    let detail = if last.is_empty() { "no output" } else { last.trim() };
    Err(CaptureError::Browser(format!(
        "exited before DevTools was ready: {detail}"
    )))
}

#[derive(Debug, Clone)]
pub struct ChromeCapturer {
    config: CaptureConfig,
}

impl ChromeCapturer {
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl PageCapturer for ChromeCapturer {
    async fn capture(&self, url: &str) -> Result<Vec<Screenshot>, CaptureError> {
        if !is_valid_url(url) {
            return Err(CaptureError::InvalidUrl(url.to_owned()));
        }
        let url = normalize_url(url);

        let output = tempfile::Builder::new()
            .prefix("folio_capture_")
            .suffix(".png")
            .tempfile()?
            .into_temp_path();

        let mut session = BrowserSession::launch(&self.config).await?;
        let shot = session.screenshot(&url, &output).await;
        if let Err(e) = session.close().await {
            tracing::warn!("failed to release browser session: {e}");
        }
        shot?;

        tracing::info!(url = %url, path = %output.display(), "captured page");
        Ok(vec![Screenshot::new(output)])
    }
}
