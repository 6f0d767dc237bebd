//! Chat platform seam.
//!
//! The news desk only talks to the platform through [`NewsPlatform`], so the
//! delivery flow can run against an in-memory fake in tests and against
//! Discord in production.

use async_trait::async_trait;
use thiserror::Error;

use dailymovich_types::{ChannelRef, DisplayPayload, PostedMessage};

#[derive(Debug, Error)]
pub enum PlatformError {
    /// The bot lacks permission to post in the channel.
    #[error("missing permissions for channel {0}")]
    Forbidden(u64),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Operations the news desk needs from a chat platform.
///
/// Implementations use `&self` throughout and must be shareable across jobs.
#[async_trait]
pub trait NewsPlatform: Send + Sync {
    /// Look up a guild text channel. `None` when it does not exist or is not
    /// visible to the bot.
    async fn resolve_channel(&self, channel_id: u64) -> Option<ChannelRef>;

    /// Post a rich embed.
    async fn send_embed(
        &self,
        channel: &ChannelRef,
        payload: &DisplayPayload,
    ) -> Result<PostedMessage, PlatformError>;

    /// React to a posted message with a unicode emoji.
    async fn add_reaction(&self, message: &PostedMessage, emoji: &str)
        -> Result<(), PlatformError>;

    /// Text channels of a guild, in display order.
    async fn text_channels(&self, guild_id: u64) -> Result<Vec<ChannelRef>, PlatformError>;

    /// Post plain text.
    async fn send_text(&self, channel: &ChannelRef, text: &str) -> Result<(), PlatformError>;
}
