//! Report generator — turns a report mode into a display payload.

use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use dailymovich_llm::CompletionProvider;
use dailymovich_types::{BotIdentity, DisplayPayload, EmbedColor, EmbedFooter, ReportMode};

pub const DAILY_TITLE: &str = ":scroll: daily news :scroll:";
pub const DAILY_FOOTER: &str = "provided by the dailymovich";
pub const BREAKING_TITLE: &str =
    ":rotating_light::rotating_light: breaking news :rotating_light::rotating_light:";
pub const BREAKING_IMAGE_URL: &str = "https://i.imgur.com/iLW36lG.jpg";

/// Maximum characters in an embed description (Discord API limit is 4096).
const MAX_DESCRIPTION_LEN: usize = 4096;

/// Builds display payloads from one completion call each.
pub struct ReportGenerator {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
    identity: BotIdentity,
}

impl ReportGenerator {
    /// `identity` signs the footer of breaking reports.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        system_prompt: String,
        identity: BotIdentity,
    ) -> Self {
        Self {
            provider,
            system_prompt,
            identity,
        }
    }

    /// Ask the completion service for a report and wrap it for display.
    ///
    /// Completion errors are returned as-is; nothing is retried.
    pub async fn generate(&self, mode: ReportMode) -> anyhow::Result<DisplayPayload> {
        let text = self
            .provider
            .complete(&self.system_prompt, mode.request())
            .await
            .with_context(|| format!("failed to generate {mode} report"))?;
        debug!(%mode, chars = text.chars().count(), "Report generated");
        Ok(self.build_payload(mode, text, &mut rand::thread_rng()))
    }

    /// Wrap report text into the payload for `mode`.
    pub fn build_payload<R: Rng + ?Sized>(
        &self,
        mode: ReportMode,
        text: String,
        rng: &mut R,
    ) -> DisplayPayload {
        let description = truncate_description(text);
        match mode {
            ReportMode::Regular => DisplayPayload {
                title: DAILY_TITLE.to_string(),
                description,
                color: *EmbedColor::DAILY_PALETTE
                    .choose(rng)
                    .unwrap_or(&EmbedColor::Blue),
                footer: Some(EmbedFooter {
                    text: DAILY_FOOTER.to_string(),
                    icon_url: None,
                }),
                image_url: None,
            },
            ReportMode::Breaking => DisplayPayload {
                title: BREAKING_TITLE.to_string(),
                description,
                color: EmbedColor::Red,
                footer: Some(EmbedFooter {
                    text: self.identity.name.clone(),
                    icon_url: self.identity.avatar_url.clone(),
                }),
                image_url: Some(BREAKING_IMAGE_URL.to_string()),
            },
        }
    }
}

/// Cut `text` to the embed description limit on a char boundary.
fn truncate_description(text: String) -> String {
    match text.char_indices().nth(MAX_DESCRIPTION_LEN) {
        Some((byte_pos, _)) => text[..byte_pos].to_string(),
        None => text,
    }
}
