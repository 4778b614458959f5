use std::path::PathBuf;

use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("FOLIO_BOT_NAME") {
            self.bot.name = v;
        }
        if let Ok(v) = std::env::var("FOLIO_COMMAND_PREFIX") {
            self.bot.command_prefix = v;
        }
        if let Ok(v) = std::env::var("FOLIO_MIN_TEXT_CHARS") {
            match v.parse::<usize>() {
                Ok(n) => self.bot.min_text_chars = n,
                Err(_) => tracing::warn!("ignoring invalid FOLIO_MIN_TEXT_CHARS value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("FOLIO_MAX_ATTACHMENT_BYTES") {
            match v.parse::<u64>() {
                Ok(n) => self.bot.max_attachment_bytes = n,
                Err(_) => tracing::warn!("ignoring invalid FOLIO_MAX_ATTACHMENT_BYTES value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("FOLIO_TEMP_DIR") {
            self.bot.temp_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("FOLIO_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("FOLIO_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("FOLIO_DISCORD_ALLOWED_USERS") {
            self.discord.allowed_user_ids = split_list(&v);
        }
        if let Ok(v) = std::env::var("FOLIO_DISCORD_ALLOWED_ROLES") {
            self.discord.allowed_role_ids = split_list(&v);
        }
        if let Ok(v) = std::env::var("FOLIO_DISCORD_ALLOWED_CHANNELS") {
            self.discord.allowed_channel_ids = split_list(&v);
        }
        if let Ok(v) = std::env::var("FOLIO_BROWSER_PATH") {
            self.capture.browser_path = v;
        }
        if let Ok(v) = std::env::var("FOLIO_CAPTURE_TIMEOUT")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.capture.navigation_timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("FOLIO_CAPTURE_SETTLE_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            self.capture.settle_delay_ms = ms;
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
