use log::debug;

use super::queue::QueueSystem;
use super::router::CommandInvocation;
use crate::types::ChatMessage;

const NOT_ACTIVE: &str = "Queue is not active. Use !startqueue to activate.";

/// Chat front-end for the [`QueueSystem`]
#[derive(Default)]
pub struct QueueCommands {
    queue: QueueSystem,
}

impl QueueCommands {
    pub fn new(queue: QueueSystem) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &QueueSystem {
        &self.queue
    }

    pub fn is_active(&self) -> bool {
        self.queue.is_active()
    }

    /// Viewer commands. Only reachable while the queue is open.
    pub fn process_user_command(&mut self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        let name = message.display_name();

        let reply = match invocation.name.as_str() {
            "join" => match self.queue.join(name) {
                Ok(position) => format!("{} joined the queue! Position: #{}", name, position),
                Err(e) => e.to_string(),
            },
            "leave" => match self.queue.leave(name) {
                Ok(()) => format!("{} left the queue.", name),
                Err(e) => e.to_string(),
            },
            "view" => match self.queue.view() {
                Some(rendered) => format!("Queue: {}", rendered),
                None => "Queue is empty!".to_string(),
            },
            "check" => match self.queue.check(name) {
                Some(spot) => format!(
                    "{} is in queue at position #{} ({} users ahead)",
                    name, spot.position, spot.ahead
                ),
                None => format!("{} is not in the queue.", name),
            },
            _ => return None,
        };

        Some(reply)
    }

    /// Moderator commands. Opening and closing always work; the rest need an open queue.
    pub fn process_admin_command(&mut self, invocation: &CommandInvocation<'_>) -> Option<String> {
        match invocation.name.as_str() {
            "startqueue" => {
                self.queue.toggle(true);
                return Some("Queue activated! ✓".to_string());
            }
            "closequeue" => {
                self.queue.toggle(false);
                return Some("Queue deactivated! ✗".to_string());
            }
            "next" | "add" | "remove" | "clearqueue" => {}
            _ => return None,
        }

        if !self.queue.is_active() {
            return Some(NOT_ACTIVE.to_string());
        }

        let target = invocation.args.first().copied();
        let reply = match invocation.name.as_str() {
            "next" => self.handle_next(target),
            "add" => match target {
                Some(user) => match self.queue.add(user) {
                    Ok(position) => format!("{} was added to the queue! Position: #{}", user, position),
                    Err(e) => e.to_string(),
                },
                None => "Usage: !add <username>".to_string(),
            },
            "remove" => match target {
                Some(user) => match self.queue.remove(user) {
                    Ok(()) => format!("{} was removed from the queue.", user),
                    Err(e) => e.to_string(),
                },
                None => "Usage: !remove <username>".to_string(),
            },
            _ => {
                let count = self.queue.clear();
                format!("Queue cleared! ({} users removed)", count)
            }
        };

        Some(reply)
    }

    fn handle_next(&mut self, arg: Option<&str>) -> String {
        let count = match arg.and_then(|a| a.parse::<usize>().ok()) {
            Some(n) if n >= 1 => n,
            _ => {
                debug!("Rejected !next argument {:?}", arg);
                return "Usage: !next [number]".to_string();
            }
        };

        match self.queue.next(count) {
            Ok(users) => {
                let mentions = users
                    .iter()
                    .map(|user| format!("@{}", user))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Next up: {} 🎮", mentions)
            }
            Err(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(commands: &mut QueueCommands, name: &str, text: &str) -> Option<String> {
        let message = ChatMessage::new("chan", name, text, false);
        let invocation = CommandInvocation::parse(&message.content, "!")?;
        commands.process_user_command(&invocation, &message)
    }

    fn admin(commands: &mut QueueCommands, text: &str) -> Option<String> {
        let invocation = CommandInvocation::parse(text, "!")?;
        commands.process_admin_command(&invocation)
    }

    fn open() -> QueueCommands {
        let mut commands = QueueCommands::default();
        admin(&mut commands, "!startqueue");
        commands
    }

    #[test]
    fn test_user_flow() {
        let mut commands = open();
        assert_eq!(user(&mut commands, "alice", "!join").unwrap(), "alice joined the queue! Position: #1");
        assert_eq!(user(&mut commands, "bob", "!join").unwrap(), "bob joined the queue! Position: #2");
        assert_eq!(user(&mut commands, "alice", "!join").unwrap(), "alice is already in the queue!");
        assert_eq!(user(&mut commands, "bob", "!view").unwrap(), "Queue: #1 alice | #2 bob");
        assert_eq!(
            user(&mut commands, "bob", "!check").unwrap(),
            "bob is in queue at position #2 (1 users ahead)"
        );
        assert_eq!(user(&mut commands, "alice", "!leave").unwrap(), "alice left the queue.");
        assert_eq!(user(&mut commands, "alice", "!leave").unwrap(), "alice is not in the queue!");
        assert_eq!(user(&mut commands, "alice", "!check").unwrap(), "alice is not in the queue.");
    }

    #[test]
    fn test_empty_view() {
        let mut commands = open();
        assert_eq!(user(&mut commands, "alice", "!view").unwrap(), "Queue is empty!");
    }

    #[test]
    fn test_unknown_commands_are_not_claimed() {
        let mut commands = open();
        assert_eq!(user(&mut commands, "alice", "!hello"), None);
        assert_eq!(admin(&mut commands, "!hello"), None);
    }

    #[test]
    fn test_admin_commands_need_open_queue() {
        let mut commands = QueueCommands::default();
        for text in ["!next 1", "!add bob", "!remove bob", "!clearqueue"] {
            assert_eq!(admin(&mut commands, text).unwrap(), NOT_ACTIVE);
        }
        assert!(commands.queue().is_empty());
        assert_eq!(admin(&mut commands, "!closequeue").unwrap(), "Queue deactivated! ✗");
        assert_eq!(admin(&mut commands, "!startqueue").unwrap(), "Queue activated! ✓");
        assert!(commands.is_active());
    }

    #[test]
    fn test_add_remove_wording() {
        let mut commands = open();
        assert_eq!(admin(&mut commands, "!add Carol").unwrap(), "Carol was added to the queue! Position: #1");
        assert_eq!(admin(&mut commands, "!add Carol").unwrap(), "Carol is already in the queue!");
        assert_eq!(admin(&mut commands, "!remove Carol").unwrap(), "Carol was removed from the queue.");
        assert_eq!(admin(&mut commands, "!remove Carol").unwrap(), "Carol is not in the queue!");
        assert_eq!(admin(&mut commands, "!add").unwrap(), "Usage: !add <username>");
        assert_eq!(admin(&mut commands, "!remove").unwrap(), "Usage: !remove <username>");
    }

    #[test]
    fn test_next_usage_and_results() {
        let mut commands = open();
        assert_eq!(admin(&mut commands, "!next 1").unwrap(), "Queue is empty!");
        for name in ["a", "b", "c"] {
            user(&mut commands, name, "!join");
        }
        for bad in ["!next", "!next zero", "!next 0", "!next -2"] {
            assert_eq!(admin(&mut commands, bad).unwrap(), "Usage: !next [number]");
        }
        assert_eq!(commands.queue().len(), 3);
        assert_eq!(admin(&mut commands, "!next 2").unwrap(), "Next up: @a, @b 🎮");
        assert_eq!(commands.queue().entries(), vec!["c"]);
    }

    #[test]
    fn test_clearqueue_counts() {
        let mut commands = open();
        user(&mut commands, "a", "!join");
        user(&mut commands, "b", "!join");
        assert_eq!(admin(&mut commands, "!clearqueue").unwrap(), "Queue cleared! (2 users removed)");
        assert!(commands.queue().is_empty());
    }
}
