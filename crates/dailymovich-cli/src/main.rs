use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use dailymovich_llm::{CompletionProvider, OpenAiChat};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = dailymovich_config::load_settings().context("Failed to load configuration")?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(match &settings.openai_base_url {
        Some(base_url) => OpenAiChat::with_base_url(
            settings.openai_api_key.clone(),
            settings.model.clone(),
            base_url.clone(),
        ),
        None => OpenAiChat::new(settings.openai_api_key.clone(), settings.model.clone()),
    });

    info!(
        report_channel = settings.report_channel,
        model = provider.model(),
        timezone = %settings.timezone,
        "Starting dailymovich"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(dailymovich_channel_discord::run_bot(settings, provider))
}
