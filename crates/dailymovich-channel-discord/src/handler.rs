//! Serenity EventHandler that starts the news jobs once the bot is connected.

use std::sync::Arc;

use serenity::all::{ActivityData, OnlineStatus};
use serenity::async_trait;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, info};

use dailymovich_config::Settings;
use dailymovich_cron::{Schedule, Scheduler, SchedulerHandle};
use dailymovich_llm::CompletionProvider;
use dailymovich_news::{NewsDesk, NewsJob, NewsPlatform, ReportGenerator};
use dailymovich_types::BotIdentity;

use crate::DiscordPlatform;

/// Presence activity shown while the bot is online.
const PRESENCE_ACTIVITY: &str = "\u{1F6A8}\u{1F6A8}\u{1F6A8}";

/// Wire the breaking-news and daily-news jobs to a platform.
pub fn news_scheduler(
    settings: &Settings,
    platform: Arc<dyn NewsPlatform>,
    provider: Arc<dyn CompletionProvider>,
    identity: BotIdentity,
) -> Scheduler {
    let generator = ReportGenerator::new(provider, settings.system_prompt.clone(), identity);
    let desk = Arc::new(NewsDesk::new(platform, generator, settings.report_channel));

    let mut scheduler = Scheduler::new();
    scheduler.register(
        Schedule::Every(settings.breaking_interval),
        Arc::new(NewsJob::breaking(desk.clone())),
    );
    scheduler.register(
        Schedule::daily(settings.daily_times.clone(), settings.timezone),
        Arc::new(NewsJob::daily(desk)),
    );
    scheduler
}

/// Serenity event handler owning the news scheduler.
pub struct NewsHandler {
    settings: Arc<Settings>,
    provider: Arc<dyn CompletionProvider>,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl NewsHandler {
    pub fn new(settings: Arc<Settings>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            settings,
            provider,
            scheduler: Mutex::new(None),
        }
    }

    /// Start the news jobs unless they are already running.
    ///
    /// `ready` fires again after every reconnect; only the first call starts a
    /// scheduler. Returns whether this call started it.
    pub async fn start_once(
        &self,
        platform: Arc<dyn NewsPlatform>,
        identity: BotIdentity,
    ) -> bool {
        let mut running = self.scheduler.lock().await;
        if running.is_some() {
            debug!("Scheduler already running, ignoring ready event");
            return false;
        }
        let scheduler = news_scheduler(&self.settings, platform, self.provider.clone(), identity);
        *running = Some(scheduler.start());
        true
    }
}

#[async_trait]
impl EventHandler for NewsHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "Discord bot connected and ready"
        );

        let identity = BotIdentity {
            name: ready.user.name.clone(),
            avatar_url: ready.user.avatar_url(),
        };
        let platform = Arc::new(DiscordPlatform::new(ctx.http.clone()));
        self.start_once(platform, identity).await;

        ctx.set_presence(
            Some(ActivityData::playing(PRESENCE_ACTIVITY)),
            OnlineStatus::DoNotDisturb,
        );
    }
}
