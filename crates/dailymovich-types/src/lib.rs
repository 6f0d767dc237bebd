use serde::{Deserialize, Serialize};

// ──────────────────── Report Types ────────────────────

/// Which kind of report a job asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Scheduled daily bulletin.
    Regular,
    /// Urgent alert, cross-posted to the rest of the guild.
    Breaking,
}

impl ReportMode {
    /// User instruction sent to the completion service for this mode.
    pub fn request(self) -> &'static str {
        match self {
            ReportMode::Regular => "generate regular daily news",
            ReportMode::Breaking => "generate breaking news",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportMode::Regular => "regular",
            ReportMode::Breaking => "breaking",
        }
    }
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────── Embed Types ────────────────────

/// Embed colours, using Discord's palette values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedColor {
    Blue,
    DarkMagenta,
    Blurple,
    DarkOrange,
    Red,
}

impl EmbedColor {
    /// Colours a regular report picks from.
    pub const DAILY_PALETTE: [EmbedColor; 4] = [
        EmbedColor::Blue,
        EmbedColor::DarkMagenta,
        EmbedColor::Blurple,
        EmbedColor::DarkOrange,
    ];

    /// 24-bit RGB value.
    pub fn rgb(self) -> u32 {
        match self {
            EmbedColor::Blue => 0x3498DB,
            EmbedColor::DarkMagenta => 0xAD1457,
            EmbedColor::Blurple => 0x5865F2,
            EmbedColor::DarkOrange => 0xA84300,
            EmbedColor::Red => 0xE74C3C,
        }
    }
}

/// Footer line of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Presentation-only bundle built from a generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPayload {
    /// Embed title.
    pub title: String,
    /// Report text as returned by the completion service.
    pub description: String,
    /// Side bar colour.
    pub color: EmbedColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// Large image shown under the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// ──────────────────── Platform Types ────────────────────

/// The bot's own account, as reported by the gateway on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A resolved guild text channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: u64,
    pub guild_id: u64,
}

/// A message the bot has posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostedMessage {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Reaction voting "this report was good".
pub const THUMBS_UP: &str = "\u{1F44D}";
/// Reaction voting "this report was bad".
pub const THUMBS_DOWN: &str = "\u{1F44E}";
