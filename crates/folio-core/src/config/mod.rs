mod env;
mod types;


pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::chunker::{LABEL_RESERVE, MESSAGE_CHAR_LIMIT};
use crate::vault::{Secret, VaultProvider};

pub const DISCORD_TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const CLAUDE_API_KEY_VAR: &str = "CLAUDE_API_KEY";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Resolve the bot credentials through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        if let Some(val) = vault.get_secret(DISCORD_TOKEN_VAR).await? {
            self.secrets.discord_token = Some(Secret::new(val));
        }
        if let Some(val) = vault.get_secret(CLAUDE_API_KEY_VAR).await? {
            self.secrets.claude_api_key = Some(Secret::new(val));
        }
        Ok(())
    }

    /// Check that the bot can start with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Discord token is missing or a limit is out of range.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secrets.discord_token.is_none() {
            bail!("{DISCORD_TOKEN_VAR} not found in environment variables");
        }
        if self.bot.command_prefix.is_empty() {
            bail!("bot.command_prefix must not be empty");
        }
        if self.chunking.segment_stride == 0 {
            bail!("chunking.segment_stride must be greater than 0");
        }
        if self.chunking.single_message_limit > MESSAGE_CHAR_LIMIT {
            bail!(
                "chunking.single_message_limit ({}) must not exceed {MESSAGE_CHAR_LIMIT}",
                self.chunking.single_message_limit
            );
        }
        if self.chunking.segment_stride + LABEL_RESERVE > self.chunking.single_message_limit {
            bail!(
                "chunking.segment_stride ({}) must leave {LABEL_RESERVE} characters of \
                 chunking.single_message_limit ({}) for part labels",
                self.chunking.segment_stride,
                self.chunking.single_message_limit
            );
        }
        if self.capture.navigation_timeout_secs == 0 {
            bail!("capture.navigation_timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

/// Priority: `--config <path>` > `FOLIO_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    config_path_from(&args, std::env::var("FOLIO_CONFIG").ok())
}

fn config_path_from(args: &[String], env_path: Option<String>) -> PathBuf {
    if let Some(path) = args.windows(2).find(|w| w[0] == "--config").map(|w| &w[1]) {
        return PathBuf::from(path);
    }
    if let Some(path) = env_path {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}
