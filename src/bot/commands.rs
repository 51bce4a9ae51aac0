use log::debug;
use std::time::{Duration, Instant};

use super::router::CommandInvocation;
use crate::types::ChatMessage;

/// Small always-on commands: `!hello`, `!ping`, `!time` and the moderator `!clear`
pub struct GeneralCommands {
    started_at: Instant,
}

impl GeneralCommands {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn process_command(&self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        let name = message.display_name();

        match invocation.name.as_str() {
            "hello" => Some(format!("Hello @{}! 👋", name)),
            "ping" => Some(format!("Pong! @{}", name)),
            "time" => Some(format!("Bot has been running for {}", format_uptime(self.started_at.elapsed()))),
            // Acknowledgement only, nothing is actually cleared
            "clear" if message.is_privileged => Some("Chat cleared! 🧹".to_string()),
            _ => {
                debug!("Unknown command: {}", invocation.name);
                None
            }
        }
    }
}

impl Default for GeneralCommands {
    fn default() -> Self {
        Self::new()
    }
}

/// `1h 2m 3s`
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}
