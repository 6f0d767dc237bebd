//! News desk — delivers generated reports to the chat platform.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use dailymovich_cron::Job;
use dailymovich_types::{ChannelRef, PostedMessage, ReportMode, THUMBS_DOWN, THUMBS_UP};

use crate::platform::{NewsPlatform, PlatformError};
use crate::report::ReportGenerator;

/// Pointer posted in every other channel when breaking news goes out.
pub fn breaking_pointer(report_channel: u64) -> String {
    format!(
        ":rotating_light::rotating_light::rotating_light: breaking news at <#{report_channel}> :rotating_light::rotating_light::rotating_light:"
    )
}

/// Resolves the report channel and publishes reports into it.
pub struct NewsDesk {
    platform: Arc<dyn NewsPlatform>,
    generator: ReportGenerator,
    report_channel: u64,
}

impl NewsDesk {
    pub fn new(
        platform: Arc<dyn NewsPlatform>,
        generator: ReportGenerator,
        report_channel: u64,
    ) -> Self {
        Self {
            platform,
            generator,
            report_channel,
        }
    }

    /// Generate and post one report.
    ///
    /// Returns `Ok(None)` without generating anything when the report channel
    /// cannot be resolved.
    pub async fn publish(&self, mode: ReportMode) -> anyhow::Result<Option<PostedMessage>> {
        let Some(channel) = self.platform.resolve_channel(self.report_channel).await else {
            debug!(
                channel_id = self.report_channel,
                %mode,
                "Report channel not resolved, skipping"
            );
            return Ok(None);
        };

        let payload = self.generator.generate(mode).await?;
        let message = self.platform.send_embed(&channel, &payload).await?;
        self.add_votes(&message).await?;

        info!(
            channel_id = channel.id,
            message_id = message.message_id,
            %mode,
            "Report published"
        );

        if mode == ReportMode::Breaking {
            self.broadcast_pointer(&channel).await?;
        }

        Ok(Some(message))
    }

    /// React with both vote emojis concurrently.
    ///
    /// Both requests run to completion even when one fails; the first error is
    /// returned afterwards.
    async fn add_votes(&self, message: &PostedMessage) -> Result<(), PlatformError> {
        let (up, down) = tokio::join!(
            self.platform.add_reaction(message, THUMBS_UP),
            self.platform.add_reaction(message, THUMBS_DOWN),
        );
        up.and(down)
    }

    /// Point every other text channel of the guild at the report.
    ///
    /// Channels the bot may not post in are skipped; any other failure stops
    /// the broadcast.
    async fn broadcast_pointer(&self, report: &ChannelRef) -> Result<(), PlatformError> {
        let text = breaking_pointer(report.id);
        let channels = self.platform.text_channels(report.guild_id).await?;

        let mut notified = 0usize;
        for channel in channels.iter().filter(|c| c.id != report.id) {
            match self.platform.send_text(channel, &text).await {
                Ok(()) => notified += 1,
                Err(PlatformError::Forbidden(id)) => {
                    debug!(channel_id = id, "No permission to post pointer, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            guild_id = report.guild_id,
            notified, "Breaking news pointer broadcast"
        );
        Ok(())
    }
}

/// Scheduled job publishing one report mode through a shared desk.
pub struct NewsJob {
    desk: Arc<NewsDesk>,
    mode: ReportMode,
}

impl NewsJob {
    pub fn new(desk: Arc<NewsDesk>, mode: ReportMode) -> Self {
        Self { desk, mode }
    }

    pub fn daily(desk: Arc<NewsDesk>) -> Self {
        Self::new(desk, ReportMode::Regular)
    }

    pub fn breaking(desk: Arc<NewsDesk>) -> Self {
        Self::new(desk, ReportMode::Breaking)
    }
}

#[async_trait]
impl Job for NewsJob {
    fn name(&self) -> &str {
        match self.mode {
            ReportMode::Regular => "daily-news",
            ReportMode::Breaking => "breaking-news",
        }
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.desk.publish(self.mode).await?;
        Ok(())
    }
}
