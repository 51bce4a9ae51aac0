//! # Queue Bot
//!
//! A Twitch chat bot that runs a viewer queue, hands out daily fortunes and
//! suggests meals from a moderator-curated list.
//!
//! ## Features
//!
//! - **Viewer Queue**: `!join`, `!leave`, `!view`, `!check` while a moderator has the queue open
//! - **Queue Management**: `!startqueue`, `!closequeue`, `!next`, `!add`, `!remove`, `!clearqueue`
//! - **Fortunes**: `!fortune` with a per-viewer cooldown persisted to disk
//! - **Meal List**: `!meal`, `!addmeal`, `!removemeal`, `!listmeals` backed by a JSON file
//! - **Thank-yous**: automatic replies to cheers and subscriptions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queuebot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::load("config/bot.yaml").await?;
//!     let router = CommandRouter::from_config(&config);
//!
//!     let twitch = TwitchConnection::new(TwitchConfig::from_env()?);
//!     let mut bot = ChatBot::new(Box::new(twitch), router);
//!
//!     bot.start().await?;
//!     bot.run().await?;
//!     bot.shutdown().await
//! }
//! ```

pub mod bot;
pub mod config;
pub mod platforms;
pub mod types;

// Re-export commonly used items
pub mod prelude {
    pub use crate::bot::router::{CommandInvocation, CommandRouter};
    pub use crate::bot::ChatBot;
    pub use crate::config::BotConfig;
    pub use crate::platforms::{
        twitch::{TwitchConfig, TwitchConnection},
        PlatformConnection,
    };
    pub use crate::types::{ChatEvent, ChatMessage, SubscriptionPlan};
    pub use anyhow::Result;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
