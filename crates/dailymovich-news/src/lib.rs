//! dailymovich-news: report generation and delivery.
//!
//! Provides:
//! - [`report::ReportGenerator`]: mode -> completion call -> display payload
//! - [`desk::NewsDesk`]: resolve channel, send, react, broadcast
//! - [`desk::NewsJob`]: the scheduled entry point for both report modes
//! - [`platform::NewsPlatform`]: the seam a chat platform adapter implements

pub mod desk;
pub mod platform;
pub mod report;

pub use desk::{NewsDesk, NewsJob};
pub use platform::{NewsPlatform, PlatformError};
pub use report::ReportGenerator;
