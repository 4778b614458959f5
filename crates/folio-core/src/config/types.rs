use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chunker::ChunkLimits;
use crate::extract::DEFAULT_MAX_FILE_SIZE;
use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_name")]
    pub name: String,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Extracted documents shorter than this are rejected as unreadable.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
    /// Where downloaded attachments are staged; the system temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

fn default_bot_name() -> String {
    "Folio".into()
}

fn default_command_prefix() -> String {
    "!".into()
}

fn default_min_text_chars() -> usize {
    100
}

fn default_max_attachment_bytes() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            command_prefix: default_command_prefix(),
            min_text_chars: default_min_text_chars(),
            max_attachment_bytes: default_max_attachment_bytes(),
            temp_dir: None,
        }
    }
}

impl BotConfig {
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

fn default_llm_model() -> String {
    folio_llm::claude::DEFAULT_MODEL.into()
}

fn default_llm_base_url() -> String {
    folio_llm::claude::DEFAULT_API_URL.into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: default_llm_base_url(),
        }
    }
}

/// Discord access lists. Empty lists allow everyone.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub allowed_user_ids: Vec<String>,
    #[serde(default)]
    pub allowed_role_ids: Vec<String>,
    #[serde(default)]
    pub allowed_channel_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default = "default_browser_path")]
    pub browser_path: String,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    /// Extra time granted after network idle for late animations and lazy images.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Viewport height used for layout; the screenshot always spans the whole document.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

fn default_browser_path() -> String {
    "chromium".into()
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            browser_path: default_browser_path(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_single_message_limit")]
    pub single_message_limit: usize,
    #[serde(default = "default_segment_stride")]
    pub segment_stride: usize,
}

fn default_single_message_limit() -> usize {
    ChunkLimits::default().single_message
}

fn default_segment_stride() -> usize {
    ChunkLimits::default().stride
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            single_message_limit: default_single_message_limit(),
            segment_stride: default_segment_stride(),
        }
    }
}

impl ChunkingConfig {
    #[must_use]
    pub fn limits(&self) -> ChunkLimits {
        ChunkLimits {
            single_message: self.single_message_limit,
            stride: self.segment_stride,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub discord_token: Option<Secret>,
    pub claude_api_key: Option<Secret>,
}
