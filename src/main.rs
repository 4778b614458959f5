use std::sync::Arc;

use anyhow::Context;
use folio_channels::{AccessPolicy, DiscordChannel};
use folio_core::capture::ChromeCapturer;
use folio_core::config::{CLAUDE_API_KEY_VAR, Config, resolve_config_path};
use folio_core::evaluator::FeedbackGenerator;
use folio_core::extract::PdfExtractor;
use folio_core::vault::EnvVaultProvider;
use folio_core::{Router, RouterSettings};
use folio_llm::claude::ClaudeProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_subscriber();
    match dotenv {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("failed to load .env: {e}"),
    }

    let config_path = resolve_config_path();
    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    config.resolve_secrets(&EnvVaultProvider).await?;
    config.validate()?;

    let discord_token = config
        .secrets
        .discord_token
        .as_ref()
        .context("discord token missing after validation")?;
    let api_key = config
        .secrets
        .claude_api_key
        .as_ref()
        .with_context(|| format!("{CLAUDE_API_KEY_VAR} not found in environment variables"))?;

    let provider = ClaudeProvider::new(api_key.expose().to_owned(), config.llm.model.clone())
        .with_api_url(config.llm.base_url.clone());
    let extractor = PdfExtractor::new(config.bot.max_attachment_bytes);
    let capturer = ChromeCapturer::new(config.capture.clone());
    let (channel, mut inbox) = DiscordChannel::connect(
        discord_token.expose(),
        AccessPolicy::from(&config.discord),
    );

    let router = Arc::new(Router::new(
        channel,
        FeedbackGenerator::new(provider),
        extractor,
        capturer,
        RouterSettings::from_config(&config),
    ));

    tracing::info!(
        name = %config.bot.name,
        model = %config.llm.model,
        prefix = %config.bot.command_prefix,
        "bot starting"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            msg = inbox.recv() => {
                let Some(msg) = msg else {
                    tracing::warn!("discord gateway stopped");
                    break;
                };
                router.spawn(msg);
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!("failed to listen for ctrl-c: {e:#}");
                }
                tracing::info!("received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
