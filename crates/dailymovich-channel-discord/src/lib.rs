//! Discord adapter for the news desk.
//!
//! Uses serenity to connect to the Discord Gateway. Channel lookups, posts
//! and reactions go through the REST client, so no gateway cache is needed.
//!
//! # Environment
//!
//! ```text
//! DISCORD_TOKEN=MTIzNDU2Nzg5...
//! REPORT_CHANNEL=112233445566778899
//! ```

pub mod handler;

use std::sync::Arc;

use anyhow::Context;
use serenity::all::{
    ChannelId, ChannelType, Colour, CreateEmbed, CreateEmbedFooter, CreateMessage,
    GatewayIntents, GuildId, Http, MessageId, ReactionType,
};
use serenity::Client;
use tracing::{debug, info};

use dailymovich_config::Settings;
use dailymovich_llm::CompletionProvider;
use dailymovich_news::{NewsPlatform, PlatformError};
use dailymovich_types::{ChannelRef, DisplayPayload, PostedMessage};

/// `NewsPlatform` backed by the Discord REST API.
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl NewsPlatform for DiscordPlatform {
    async fn resolve_channel(&self, channel_id: u64) -> Option<ChannelRef> {
        if channel_id == 0 {
            return None;
        }
        match self.http.get_channel(ChannelId::new(channel_id)).await {
            Ok(channel) => channel.guild().map(|c| ChannelRef {
                id: c.id.get(),
                guild_id: c.guild_id.get(),
            }),
            Err(e) => {
                debug!(channel_id, "Channel lookup failed: {e}");
                None
            }
        }
    }

    async fn send_embed(
        &self,
        channel: &ChannelRef,
        payload: &DisplayPayload,
    ) -> Result<PostedMessage, PlatformError> {
        let builder = CreateMessage::new().embed(build_embed(payload));
        let message = ChannelId::new(channel.id)
            .send_message(&self.http, builder)
            .await
            .map_err(|e| platform_error(channel.id, e))?;
        Ok(PostedMessage {
            channel_id: channel.id,
            message_id: message.id.get(),
        })
    }

    async fn add_reaction(
        &self,
        message: &PostedMessage,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        let reaction = ReactionType::Unicode(emoji.to_string());
        self.http
            .create_reaction(
                ChannelId::new(message.channel_id),
                MessageId::new(message.message_id),
                &reaction,
            )
            .await
            .map_err(|e| platform_error(message.channel_id, e))
    }

    async fn text_channels(&self, guild_id: u64) -> Result<Vec<ChannelRef>, PlatformError> {
        let mut channels = self
            .http
            .get_channels(GuildId::new(guild_id))
            .await
            .context("Failed to list guild channels")?;
        channels.retain(|c| matches!(c.kind, ChannelType::Text | ChannelType::News));
        channels.sort_by_key(|c| (c.position, c.id));
        Ok(channels
            .into_iter()
            .map(|c| ChannelRef {
                id: c.id.get(),
                guild_id,
            })
            .collect())
    }

    async fn send_text(&self, channel: &ChannelRef, text: &str) -> Result<(), PlatformError> {
        let builder = CreateMessage::new().content(text);
        ChannelId::new(channel.id)
            .send_message(&self.http, builder)
            .await
            .map_err(|e| platform_error(channel.id, e))?;
        Ok(())
    }
}

/// Convert a display payload into a Discord embed.
fn build_embed(payload: &DisplayPayload) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&payload.title)
        .description(&payload.description)
        .colour(Colour::new(payload.color.rgb()));

    if let Some(footer) = &payload.footer {
        let mut builder = CreateEmbedFooter::new(&footer.text);
        if let Some(icon) = &footer.icon_url {
            builder = builder.icon_url(icon);
        }
        embed = embed.footer(builder);
    }

    if let Some(image) = &payload.image_url {
        embed = embed.image(image);
    }

    embed
}

/// Whether Discord refused the request for lack of permissions (HTTP 403).
fn is_forbidden(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(e) => e.status_code().is_some_and(|s| s.as_u16() == 403),
        _ => false,
    }
}

fn platform_error(channel_id: u64, err: serenity::Error) -> PlatformError {
    if is_forbidden(&err) {
        PlatformError::Forbidden(channel_id)
    } else {
        PlatformError::Other(anyhow::Error::new(err).context(format!("channel {channel_id}")))
    }
}

/// Connect to Discord and run until the client stops.
///
/// The scheduler is started from the `ready` event.
pub async fn run_bot(
    settings: Settings,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<()> {
    let intents = GatewayIntents::non_privileged();
    let token = settings.discord_token.clone();
    let event_handler = handler::NewsHandler::new(Arc::new(settings), provider);

    let mut client = Client::builder(&token, intents)
        .event_handler(event_handler)
        .await
        .context("Failed to create Discord client")?;

    info!("Connecting to Discord");
    client.start().await.context("Discord client error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailymovich_types::{EmbedColor, EmbedFooter};

    fn breaking_payload() -> DisplayPayload {
        DisplayPayload {
            title: "breaking news".into(),
            description: "Volcano erupts.".into(),
            color: EmbedColor::Red,
            footer: Some(EmbedFooter {
                text: "dailymovich".into(),
                icon_url: Some("https://cdn.discordapp.com/avatars/1/abc.png".into()),
            }),
            image_url: Some("https://i.imgur.com/iLW36lG.jpg".into()),
        }
    }

    #[test]
    fn test_build_embed_breaking() {
        let json = serde_json::to_value(build_embed(&breaking_payload())).unwrap();
        assert_eq!(json["title"], "breaking news");
        assert_eq!(json["description"], "Volcano erupts.");
        assert_eq!(json["color"], 0xE74C3C);
        assert_eq!(json["footer"]["text"], "dailymovich");
        assert_eq!(
            json["footer"]["icon_url"],
            "https://cdn.discordapp.com/avatars/1/abc.png"
        );
        assert_eq!(json["image"]["url"], "https://i.imgur.com/iLW36lG.jpg");
    }

    #[test]
    fn test_build_embed_regular_has_no_image() {
        let payload = DisplayPayload {
            title: "daily news".into(),
            description: "Calm.".into(),
            color: EmbedColor::Blurple,
            footer: Some(EmbedFooter {
                text: "provided by the dailymovich".into(),
                icon_url: None,
            }),
            image_url: None,
        };
        let json = serde_json::to_value(build_embed(&payload)).unwrap();
        assert_eq!(json["color"], 0x5865F2);
        assert_eq!(json["footer"]["text"], "provided by the dailymovich");
        assert!(json.get("image").is_none_or(|v| v.is_null()));
    }

    #[test]
    fn test_non_http_error_is_not_forbidden() {
        let err = serenity::Error::Other("gateway closed");
        assert!(!is_forbidden(&err));
        assert!(matches!(platform_error(5, err), PlatformError::Other(_)));
    }
}
