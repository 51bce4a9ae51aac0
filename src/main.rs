use anyhow::Result;
use log::{error, info};

use queuebot::config::debug_enabled;
use queuebot::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables and initialize logging
    dotenv::dotenv().ok();
    let level = if debug_enabled() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    info!("Starting QueueBot v{}", queuebot::VERSION);

    let twitch_config = match TwitchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    let config_path = BotConfig::path_from_env();
    let config = BotConfig::load(&config_path).await?;

    let router = CommandRouter::from_config(&config);
    let connection = TwitchConnection::new(twitch_config);
    let mut bot = ChatBot::new(Box::new(connection), router);

    if let Err(e) = bot.start().await {
        error!("Failed to connect: {:#}", e);
        return Err(e);
    }
    info!("Bot connected to Twitch chat!");

    tokio::select! {
        result = bot.run() => {
            if let Err(e) = result {
                error!("Event loop stopped: {:#}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down bot...");
        }
    }

    bot.shutdown().await?;
    info!("QueueBot shutdown complete. Goodbye!");
    Ok(())
}
