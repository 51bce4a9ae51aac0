use log::{debug, error, info};
use tokio::sync::mpsc;

use super::commands::GeneralCommands;
use super::cooldown::CooldownGate;
use super::fortune::FortuneCommands;
use super::list_store::ListStore;
use super::meal_commands::MealCommands;
use super::queue_commands::QueueCommands;
use crate::config::BotConfig;
use crate::types::ChatMessage;

/// Outbound replies as `(channel, text)`
pub type ResponseSender = mpsc::Sender<(String, String)>;

/// A chat line split into a command name and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    /// Lower-cased, prefix stripped
    pub name: String,
    pub args: Vec<&'a str>,
    /// Everything after the command token, trimmed
    pub rest: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// `None` unless the first token starts with `prefix`
    pub fn parse(content: &'a str, prefix: &str) -> Option<Self> {
        let trimmed = content.trim_start();
        let token = trimmed.split_whitespace().next()?;
        let name = token.strip_prefix(prefix)?.to_lowercase();
        if name.is_empty() {
            return None;
        }

        let rest = trimmed[token.len()..].trim();
        Some(Self {
            name,
            args: rest.split_whitespace().collect(),
            rest,
        })
    }
}

/// One entry in the dispatch table: who can see it and what handles it
struct Route {
    name: &'static str,
    visible: fn(&CommandRouter, &ChatMessage) -> bool,
    handle: fn(&mut CommandRouter, &CommandInvocation<'_>, &ChatMessage) -> Option<String>,
}

/// Evaluated top to bottom; the first route to produce a reply wins
const ROUTES: &[Route] = &[
    Route {
        name: "queue",
        visible: CommandRouter::queue_open,
        handle: CommandRouter::route_queue,
    },
    Route {
        name: "queue_admin",
        visible: CommandRouter::caller_privileged,
        handle: CommandRouter::route_queue_admin,
    },
    Route {
        name: "meals",
        visible: CommandRouter::always,
        handle: CommandRouter::route_meals,
    },
    Route {
        name: "fortune",
        visible: CommandRouter::always,
        handle: CommandRouter::route_fortune,
    },
    Route {
        name: "general",
        visible: CommandRouter::always,
        handle: CommandRouter::route_general,
    },
];

/// Turns chat lines into replies by asking each feature in priority order
pub struct CommandRouter {
    command_prefix: String,
    queue: QueueCommands,
    meals: MealCommands,
    fortune: FortuneCommands,
    general: GeneralCommands,
}

impl CommandRouter {
    pub fn new(
        command_prefix: String,
        queue: QueueCommands,
        meals: MealCommands,
        fortune: FortuneCommands,
        general: GeneralCommands,
    ) -> Self {
        Self {
            command_prefix,
            queue,
            meals,
            fortune,
            general,
        }
    }

    /// Build every feature and load its durable state
    pub fn from_config(config: &BotConfig) -> Self {
        let settings = &config.commands;
        let cooldowns = CooldownGate::load(&config.storage.fortune_file, settings.fortune_cooldown());
        let meals = ListStore::load(&config.storage.meals_file);

        info!(
            "Command router ready (prefix '{}', {} meals)",
            settings.command_prefix,
            meals.len()
        );

        Self::new(
            settings.command_prefix.clone(),
            QueueCommands::default(),
            MealCommands::new(meals, settings),
            FortuneCommands::new(cooldowns),
            GeneralCommands::new(),
        )
    }

    pub fn queue(&self) -> &QueueCommands {
        &self.queue
    }

    pub fn meals(&self) -> &MealCommands {
        &self.meals
    }

    pub fn fortune(&self) -> &FortuneCommands {
        &self.fortune
    }

    /// Compute the reply for `message`, if any feature recognises it
    pub fn dispatch(&mut self, message: &ChatMessage) -> Option<String> {
        let invocation = CommandInvocation::parse(&message.content, &self.command_prefix)?;

        for route in ROUTES {
            if !(route.visible)(self, message) {
                continue;
            }
            if let Some(reply) = (route.handle)(self, &invocation, message) {
                debug!("'{}' handled by {} route", invocation.name, route.name);
                return Some(reply);
            }
        }

        None
    }

    /// Dispatch and hand any reply to `response_sender`. Returns whether the
    /// message was recognised as a command.
    pub async fn process_message(&mut self, message: &ChatMessage, response_sender: &ResponseSender) -> bool {
        let Some(reply) = self.dispatch(message) else {
            return false;
        };

        info!("Replying to {} in #{}", message.display_name(), message.channel);
        if let Err(e) = response_sender.send((message.channel.clone(), reply)).await {
            error!("Failed to queue command response: {}", e);
        }
        true
    }

    fn queue_open(&self, _message: &ChatMessage) -> bool {
        self.queue.is_active()
    }

    fn caller_privileged(&self, message: &ChatMessage) -> bool {
        message.is_privileged
    }

    fn always(&self, _message: &ChatMessage) -> bool {
        true
    }

    fn route_queue(&mut self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        self.queue.process_user_command(invocation, message)
    }

    fn route_queue_admin(&mut self, invocation: &CommandInvocation<'_>, _message: &ChatMessage) -> Option<String> {
        self.queue.process_admin_command(invocation)
    }

    fn route_meals(&mut self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        self.meals.process_command(invocation, message)
    }

    fn route_fortune(&mut self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        if invocation.name != "fortune" {
            return None;
        }
        Some(self.fortune.handle_fortune(message))
    }

    fn route_general(&mut self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        self.general.process_command(invocation, message)
    }
}
